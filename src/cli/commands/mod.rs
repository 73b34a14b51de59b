pub mod camp;
pub mod data;

#[cfg(test)]
#[path = "camp_test.rs"]
mod camp_test;

#[cfg(test)]
#[path = "data_test.rs"]
mod data_test;
