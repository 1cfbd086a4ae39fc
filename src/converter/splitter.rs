/// Split `content` into chunks of at most `limit` characters.
///
/// Chunks break between lines, never inside one. A single line longer than
/// `limit` is emitted as its own chunk and may exceed the limit.
pub fn split_content(content: &str, limit: usize) -> Vec<String> {
    if content.chars().count() <= limit {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in content.split('\n') {
        let line_len = line.chars().count() + 1;

        if current_len + line_len > limit {
            flush(&mut chunks, &current);
            current.clear();
            current_len = 0;
        }

        current.push_str(line);
        current.push('\n');
        current_len += line_len;
    }
    flush(&mut chunks, &current);

    chunks
}

fn flush(chunks: &mut Vec<String>, chunk: &str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}
