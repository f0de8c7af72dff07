mod config;
mod support;
mod translate;
mod window;
