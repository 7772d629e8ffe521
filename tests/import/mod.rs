mod tests_cancellation;
mod tests_import_errors;
mod tests_pascal_scenarios;
mod tests_session_log;
mod tests_c_scenarios;
