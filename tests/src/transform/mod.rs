mod instrumenter;
mod selector;
