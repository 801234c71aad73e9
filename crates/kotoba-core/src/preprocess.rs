use unicode_normalization::UnicodeNormalization;

/// Elision placeholders marking an omitted prefix/suffix (`～する`)
pub const ELISION_MARKS: [char; 2] = ['～', '〜'];

/// Separator between interchangeable spellings (`見る; 観る`)
pub const ELEMENT_SEPARATOR: char = ';';

pub trait TermPreprocessor: Send + Sync {
    // Default JP term preprocessor
    fn clean(&self, text: &str) -> String {
        let text: String = text
            .trim()
            .chars()
            .filter(|c| !ELISION_MARKS.contains(c))
            .collect();

        // NFC only: NFKC would fold full-width forms that are distinct keys
        text.nfc().collect()
    }

    /// Split a raw term into the element strings to look up, in order
    fn elements(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text);
        let mut elements: Vec<String> = Vec::new();

        for element in cleaned.split(ELEMENT_SEPARATOR) {
            let element = element.trim();
            if element.is_empty() || elements.iter().any(|e| e == element) {
                continue;
            }
            elements.push(element.to_string());
        }

        elements
    }
}

pub struct DefaultPreprocessor;
impl TermPreprocessor for DefaultPreprocessor {}
