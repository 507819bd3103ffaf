// fn main not required
mod fallback;
mod form;
mod health_check;
mod helpers;

// all test cases share one executable; see `helpers::spawn_app` for the setup
// common to every test
