mod fixtures;

mod builder_tests;
mod cache_tests;
