/// Transient marker appended to interim renderings while text is still arriving.
pub const CURSOR: char = '▌';

/// Receives renderings of a streamed response.
pub trait RenderSink {
    /// Buffer so far, with the cursor appended. Called once per appended fragment.
    fn interim(&mut self, rendered: &str);
    /// Final buffer, without the cursor. Called exactly once per request.
    fn finalize(&mut self, text: &str);
}

#[derive(Debug, Default)]
pub struct StreamAssembler {
    buffer: String,
    fragments: usize,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Empty fragments are skipped; returns whether anything was appended.
    pub fn push(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.buffer.push_str(fragment);
        self.fragments += 1;
        true
    }

    pub fn interim(&self) -> String {
        let mut rendered = String::with_capacity(self.buffer.len() + CURSOR.len_utf8());
        rendered.push_str(&self.buffer);
        rendered.push(CURSOR);
        rendered
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_text_is_exact_concatenation() {
        let fragments = ["La ", "imagen ", "", "muestra", " un gato", " ▌", "."];
        let mut asm = StreamAssembler::new();
        for f in fragments {
            asm.push(f);
        }
        assert_eq!(asm.fragments(), 6);
        assert_eq!(asm.finish(), fragments.concat());
    }

    #[test]
    fn interim_rendering_does_not_touch_buffer() {
        let mut asm = StreamAssembler::new();
        asm.push("Hola");
        assert_eq!(asm.interim(), "Hola▌");
        assert_eq!(asm.interim(), "Hola▌");
        assert_eq!(asm.text(), "Hola");
        asm.push(" mundo");
        assert_eq!(asm.text(), "Hola mundo");
    }

    #[test]
    fn repeated_fragments_are_kept() {
        let mut asm = StreamAssembler::new();
        for _ in 0..3 {
            assert!(asm.push("ja"));
        }
        assert!(!asm.push(""));
        assert_eq!(asm.text(), "jajaja");
    }
}
