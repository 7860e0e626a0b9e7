#[derive(Clone, PartialEq, Debug, Default)]
pub enum TextConcatenator {
    DoubleNewline,
    #[default]
    SingleNewline,
    Space,
    Comma,
    Custom(String),
}

impl TextConcatenator {
    pub fn as_str(&self) -> &str {
        match self {
            TextConcatenator::DoubleNewline => "\n\n",
            TextConcatenator::SingleNewline => "\n",
            TextConcatenator::Space => " ",
            TextConcatenator::Comma => ", ",
            TextConcatenator::Custom(custom) => custom,
        }
    }

    /// Joins the parts with this separator. Empty parts are kept so that position is
    /// never lost.
    pub fn join<T: AsRef<str>>(&self, parts: &[T]) -> String {
        let mut joined = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                joined.push_str(self.as_str());
            }
            joined.push_str(part.as_ref());
        }
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_with_each_separator() {
        let parts = ["a", "b"];
        assert_eq!(TextConcatenator::DoubleNewline.join(&parts), "a\n\nb");
        assert_eq!(TextConcatenator::SingleNewline.join(&parts), "a\nb");
        assert_eq!(TextConcatenator::Space.join(&parts), "a b");
        assert_eq!(TextConcatenator::Comma.join(&parts), "a, b");
        assert_eq!(
            TextConcatenator::Custom(" | ".to_owned()).join(&parts),
            "a | b"
        );
    }

    #[test]
    fn join_keeps_empty_parts() {
        assert_eq!(TextConcatenator::Comma.join(&["a", "", "c"]), "a, , c");
    }
}
