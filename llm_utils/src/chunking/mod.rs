use crate::concatenator::TextConcatenator;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
}

/// Splits `items` into consecutive groups of at most `size` elements.
///
/// Order is preserved and no element is repeated or dropped, so concatenating the chunks
/// reproduces `items`. Only the last chunk may be shorter than `size`. An empty input yields
/// no chunks.
///
/// * `items` - The list to split, e.g. a target vocabulary.
/// * `size` - The maximum chunk length. Inclusive. Must be greater than zero.
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Result<Vec<Vec<T>>, ChunkError> {
    if size == 0 {
        return Err(ChunkError::ZeroChunkSize);
    }
    Ok(items.chunks(size).map(<[T]>::to_vec).collect())
}

/// Renders a chunk of targets as the comma separated line embedded in a prompt.
pub fn join_targets<T: AsRef<str>>(targets: &[T]) -> String {
    TextConcatenator::Comma.join(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("target_{i}")).collect()
    }

    #[test]
    fn chunks_are_bounded_ordered_and_complete() {
        for len in 0..=23 {
            let items = labels(len);
            for size in 1..=9 {
                let chunks = chunk(&items, size).unwrap();
                assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= size));
                assert_eq!(chunks.len(), len.div_ceil(size));
                if let Some((last, init)) = chunks.split_last() {
                    assert!(init.iter().all(|c| c.len() == size));
                    assert!(last.len() <= size);
                }
                assert_eq!(chunks.concat(), items, "len {len} size {size}");
            }
        }
    }

    #[test]
    fn seven_targets_by_three() {
        let chunks = chunk(&labels(7), 3).unwrap();
        let lens: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![3, 3, 1]);
        assert_eq!(chunks[2], vec!["target_6".to_owned()]);
    }

    #[test]
    fn zero_size_is_an_error() {
        assert_eq!(chunk(&labels(3), 0), Err(ChunkError::ZeroChunkSize));
    }

    #[test]
    fn join_targets_uses_comma_space() {
        assert_eq!(
            join_targets(&["Networks", "Security", "Data Mining"]),
            "Networks, Security, Data Mining"
        );
        assert_eq!(join_targets(&["Robotics"]), "Robotics");
        assert_eq!(join_targets::<&str>(&[]), "");
    }
}
