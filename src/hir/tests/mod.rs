pub(crate) mod test_support;

mod display_tests;
mod traversal_tests;
