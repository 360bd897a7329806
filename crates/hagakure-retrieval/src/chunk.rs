use hagakure_core::error::{HagakureError, Result};

/// Splits long input into passages small enough to embed as one unit
///
/// Paragraphs (separated by blank lines) are packed greedily up to
/// `max_chars`; a paragraph longer than that is cut on character
/// boundaries.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum characters per chunk
    pub max_chars: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self { max_chars: 1000 }
    }
}

impl TextChunker {
    pub fn new(max_chars: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(HagakureError::ConfigInvalid {
                key: "max_chars".to_string(),
                reason: "chunks must allow at least one character".to_string(),
            });
        }
        Ok(Self { max_chars })
    }

    /// Chunk `text`, dropping chunks that would be empty
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0;

        for paragraph in paragraphs(text) {
            let paragraph_chars = paragraph.chars().count();

            if paragraph_chars > self.max_chars {
                flush(&mut chunks, &mut current, &mut current_chars);
                chunks.extend(self.hard_split(&paragraph));
                continue;
            }

            if current.is_empty() {
                current = paragraph;
                current_chars = paragraph_chars;
            } else if current_chars + 2 + paragraph_chars <= self.max_chars {
                current.push_str("\n\n");
                current.push_str(&paragraph);
                current_chars += 2 + paragraph_chars;
            } else {
                flush(&mut chunks, &mut current, &mut current_chars);
                current = paragraph;
                current_chars = paragraph_chars;
            }
        }
        flush(&mut chunks, &mut current, &mut current_chars);

        chunks
    }

    fn hard_split(&self, paragraph: &str) -> Vec<String> {
        let chars: Vec<char> = paragraph.chars().collect();
        chars
            .chunks(self.max_chars)
            .map(|piece| piece.iter().collect::<String>().trim().to_string())
            .filter(|piece| !piece.is_empty())
            .collect()
    }
}

/// Blank-line separated paragraphs, trimmed, empty ones skipped
fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                paragraphs.push(lines.join("\n").trim().to_string());
                lines.clear();
            }
        } else {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        paragraphs.push(lines.join("\n").trim().to_string());
    }

    paragraphs
}

fn flush(chunks: &mut Vec<String>, current: &mut String, current_chars: &mut usize) {
    if !current.trim().is_empty() {
        chunks.push(std::mem::take(current));
    } else {
        current.clear();
    }
    *current_chars = 0;
}
