mod dependency_tests;
mod rules_tests;
