use crate::models::Chunk;

/// Collapses every whitespace run (newlines included) to one space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits `text` into runs of exactly `max_words` words, the last run possibly shorter.
///
/// The iterator borrows `text` and holds no state beyond its word cursor, so calling
/// `chunk_words` again on the same input yields the same sequence.
/// Callers must reject `max_words == 0` beforehand.
pub fn chunk_words(text: &str, max_words: usize) -> ChunkIter<'_> {
    ChunkIter {
        words: text.split_whitespace(),
        max_words: max_words.max(1),
        next_index: 1,
    }
}

pub struct ChunkIter<'a> {
    words: std::str::SplitWhitespace<'a>,
    max_words: usize,
    next_index: usize,
}

impl Iterator for ChunkIter<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        let buffer = self
            .words
            .by_ref()
            .take(self.max_words)
            .collect::<Vec<_>>();

        if buffer.is_empty() {
            return None;
        }

        let chunk = Chunk {
            index: self.next_index,
            text: buffer.join(" "),
        };
        self.next_index += 1;
        Some(chunk)
    }
}

/// Number of inference units a normalized document produces: one if it fits, otherwise one per chunk.
pub fn unit_count(normalized: &str, max_words: usize) -> usize {
    let words = word_count(normalized);
    if words == 0 {
        0
    } else if words <= max_words {
        1
    } else {
        words.div_ceil(max_words.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> String {
        (1..=count)
            .map(|n| format!("w{n}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn whitespace_is_normalized() {
        let input = "  A  \t  lot\nof \r\n\n  spacing\u{a0}here ";
        assert_eq!(normalize_whitespace(input), "A lot of spacing here");
    }

    #[test]
    fn blank_text_normalizes_to_empty() {
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert_eq!(chunk_words("", 5).count(), 0);
        assert_eq!(unit_count("", 5), 0);
    }

    #[test]
    fn chunks_rejoin_to_the_input_and_respect_the_limit() {
        for (words, limit) in [(1, 1), (7, 3), (9, 3), (10, 4), (3000, 3000), (7000, 3000)] {
            let text = numbered_words(words);
            let chunks = chunk_words(&text, limit).collect::<Vec<_>>();

            let rejoined = chunks
                .iter()
                .map(|chunk| chunk.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            assert_eq!(rejoined, text);
            assert_eq!(chunks.len(), words.div_ceil(limit));

            let (last, full) = chunks.split_last().expect("at least one chunk");
            assert!(full.iter().all(|chunk| chunk.word_count() == limit));
            assert!(last.word_count() <= limit && last.word_count() > 0);
        }
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let text = numbered_words(6);
        let sizes = chunk_words(&text, 3)
            .map(|chunk| chunk.word_count())
            .collect::<Vec<_>>();
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn chunk_indices_start_at_one() {
        let text = numbered_words(7000);
        let chunks = chunk_words(&text, 3000).collect::<Vec<_>>();
        let shape = chunks
            .iter()
            .map(|chunk| (chunk.index, chunk.word_count()))
            .collect::<Vec<_>>();
        assert_eq!(shape, vec![(1, 3000), (2, 3000), (3, 1000)]);
        assert!(chunks[1].text.starts_with("w3001 "));
    }

    #[test]
    fn chunking_is_repeatable() {
        let text = numbered_words(25);
        let first = chunk_words(&text, 4).collect::<Vec<_>>();
        let second = chunk_words(&text, 4).collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn document_at_the_limit_is_a_single_unit() {
        assert_eq!(unit_count(&numbered_words(3000), 3000), 1);
        assert_eq!(unit_count(&numbered_words(3001), 3000), 2);
        assert_eq!(unit_count(&numbered_words(10), 3000), 1);
    }
}
