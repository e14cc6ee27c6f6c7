use crate::models::{Chunk, Message};

/// Configuration for chunk generation.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Messages per chunk
    pub chunk_size: usize,
    /// Messages shared between consecutive chunks (must be < chunk_size)
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            overlap: 5,
        }
    }
}

/// Split the message sequence into overlapping windows sized for the
/// completion provider's context limits.
///
/// The window slides forward by `chunk_size - overlap`; the final window is
/// clipped to the true end. Every message appears in at least one chunk, and
/// content spanning a boundary appears in full in at least one chunk.
pub fn chunk_messages(messages: &[Message], config: &ChunkConfig) -> Vec<Chunk> {
    if messages.is_empty() {
        return vec![];
    }

    let stride = config.chunk_size.saturating_sub(config.overlap).max(1);
    let mut chunks = Vec::new();

    if messages.len() <= config.chunk_size {
        chunks.push(Chunk {
            index: 0,
            messages: messages.to_vec(),
        });
        return chunks;
    }

    let mut start = 0;
    loop {
        let end = (start + config.chunk_size).min(messages.len());
        chunks.push(Chunk {
            index: chunks.len(),
            messages: messages[start..end].to_vec(),
        });
        if end >= messages.len() {
            break;
        }
        start += stride;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(count: usize) -> Vec<Message> {
        (0..count)
            .map(|id| Message {
                id,
                sender: "A".to_string(),
                body: format!("message {}", id),
                timestamp: None,
            })
            .collect()
    }

    #[test]
    fn test_small_input_yields_one_chunk() {
        let msgs = messages(10);
        let chunks = chunk_messages(&msgs, &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].messages.len(), 10);
    }

    #[test]
    fn test_reference_boundaries() {
        // chunk_size=50, overlap=5, 120 messages -> [0,50) [45,95) [90,120)
        let msgs = messages(120);
        let chunks = chunk_messages(&msgs, &ChunkConfig::default());

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].messages.first().unwrap().id, 0);
        assert_eq!(chunks[0].messages.last().unwrap().id, 49);
        assert_eq!(chunks[1].messages.first().unwrap().id, 45);
        assert_eq!(chunks[1].messages.last().unwrap().id, 94);
        assert_eq!(chunks[2].messages.first().unwrap().id, 90);
        assert_eq!(chunks[2].messages.last().unwrap().id, 119);
    }

    #[test]
    fn test_every_message_covered() {
        let msgs = messages(137);
        let chunks = chunk_messages(&msgs, &ChunkConfig::default());

        let mut covered = vec![false; 137];
        for chunk in &chunks {
            for m in &chunk.messages {
                covered[m.id] = true;
            }
        }
        assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn test_chunk_indices_sequential() {
        let msgs = messages(200);
        let chunks = chunk_messages(&msgs, &ChunkConfig::default());
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk_messages(&[], &ChunkConfig::default()).is_empty());
    }
}
