mod cli_tests;
mod events_tests;
mod search_tests;
mod state_tests;
