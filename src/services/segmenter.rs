// Segmentation Service
// Slices extracted text into fixed-size blocks for classification

use crate::models::Chunk;

/// Partition text into consecutive, non-overlapping windows of
/// `chunk_size` chars starting at offset 0, keeping at most `max_chunks`
/// windows. The final chunk may be shorter; text beyond the cap is
/// silently dropped. Empty text yields no chunks.
///
/// Offsets and sizes are in chars (not UTF-8 bytes) so the window length
/// behaves consistently for non-ASCII documents.
pub fn chunk_text(text: &str, chunk_size: usize, max_chunks: usize) -> Vec<Chunk> {
    if chunk_size == 0 || max_chunks == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() && chunks.len() < max_chunks {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(Chunk {
            index: chunks.len() as i32,
            start: start as i32,
            end: end as i32,
            text: chars[start..end].iter().collect(),
        });
        start = end;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunk_text("", 600, 15).is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("hello", 600, 15);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "hello");
        assert_eq!((chunks[0].start, chunks[0].end), (0, 5));
    }

    #[test]
    fn test_exact_multiple_splits_evenly() {
        let text = "a".repeat(1200);
        let chunks = chunk_text(&text, 600, 15);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.text.chars().count() == 600));
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_final_chunk_may_be_short() {
        let text = "a".repeat(700);
        let chunks = chunk_text(&text, 600, 15);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text.chars().count(), 100);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_cap_drops_trailing_text() {
        // 9600 chars: 16 windows of 600, but only 15 retained.
        let text = "b".repeat(9600);
        let chunks = chunk_text(&text, 600, 15);
        assert_eq!(chunks.len(), 15);
        let prefix: String = text.chars().take(15 * 600).collect();
        assert_eq!(reassemble(&chunks), prefix);
    }

    #[test]
    fn test_chunk_count_formula() {
        // count == min(ceil(len / size), cap)
        for len in [0usize, 1, 599, 600, 601, 1200, 8999, 9000, 9001, 20000] {
            let text = "x".repeat(len);
            let chunks = chunk_text(&text, 600, 15);
            let expected = (len + 599) / 600;
            assert_eq!(chunks.len(), expected.min(15), "len={}", len);
        }
    }

    #[test]
    fn test_char_windows_not_byte_windows() {
        // 3-byte chars: windows still count chars.
        let text = "€".repeat(10);
        let chunks = chunk_text(&text, 4, 15);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text.chars().count(), 4);
        assert_eq!(chunks[2].text.chars().count(), 2);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let text = "y".repeat(1500);
        let chunks = chunk_text(&text, 600, 15);
        assert_eq!(chunks[0].start, 0);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(chunks.last().unwrap().end, 1500);
    }
}
