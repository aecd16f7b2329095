mod api_tests;
mod estimate_tests;
mod page_tests;
