mod common;
mod engine;
mod modules;
