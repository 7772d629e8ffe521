mod tests_keyword_snapshots;
mod tests_read_path;
