pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_sessions.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_sessions.sql")),
				"tables/002_session_interactions.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_session_interactions.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::render_schema;

	#[test]
	fn renders_both_tables() {
		let sql = render_schema();

		assert!(sql.contains("CREATE TABLE IF NOT EXISTS sessions"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS session_interactions"));
		assert!(!sql.contains("\\ir"));
	}

	#[test]
	fn session_key_is_unique() {
		let sql = render_schema();

		assert!(sql.contains("session_id TEXT NOT NULL UNIQUE"));
	}
}
