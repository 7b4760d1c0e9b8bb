use std::borrow::Cow;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::bitvec::BitVec;
use crate::error::{Error, Result, TableLineError};


/// Separator between the symbol token and the code on a table line.
pub const SEPARATOR: &str = " : ";

/// Symbols written as a named token instead of the literal character.
/// The double quote is written as an empty token.
const NAMED_TOKENS: [(char, &str); 6] = [
    (' ', "space"),
    ('\n', "new line"),
    ('\t', "tab"),
    ('\r', "carriage return"),
    ('\x0C', "formfeed"),
    ('"', ""),
];


/// Mapping from symbol to its bit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<T> {

    codes: BTreeMap<T, BitVec>

}

impl<T: Ord> CodeTable<T> {

    pub fn new() -> Self {
        Self {
            codes: BTreeMap::new()
        }
    }


    /// Sets the code of `symbol`, returning the code it replaced.
    pub fn insert(&mut self, symbol: T, code: BitVec) -> Option<BitVec> {
        self.codes.insert(symbol, code)
    }


    pub fn get(&self, symbol: &T) -> Option<&BitVec> {
        self.codes.get(symbol)
    }


    pub fn len(&self) -> usize {
        self.codes.len()
    }


    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }


    /// Entries ordered by symbol.
    pub fn iter(&self) -> btree_map::Iter<'_, T, BitVec> {
        self.codes.iter()
    }


    pub fn max_code_len(&self) -> usize {
        self.codes.values()
            .map(BitVec::len_bits)
            .max()
            .unwrap_or(0)
    }


    /// Whether no code is a prefix of another (equal codes count as prefixes).
    pub fn is_prefix_free(&self) -> bool {

        let mut codes = self.codes.values()
            .map(BitVec::to_string)
            .collect::<Vec<String>>();

        // Sorted, a prefix is immediately followed by one of its extensions
        codes.sort_unstable();

        codes.windows(2)
            .all(|pair| !pair[1].starts_with(pair[0].as_str()))
    }

}


impl<T: Ord> Default for CodeTable<T> {
    fn default() -> Self {
        Self::new()
    }
}


impl<T: Ord> FromIterator<(T, BitVec)> for CodeTable<T> {
    fn from_iter<I: IntoIterator<Item = (T, BitVec)>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect()
        }
    }
}


impl<'a, T> IntoIterator for &'a CodeTable<T> {
    type Item = (&'a T, &'a BitVec);
    type IntoIter = btree_map::Iter<'a, T, BitVec>;

    fn into_iter(self) -> Self::IntoIter {
        self.codes.iter()
    }
}


fn symbol_token(symbol: char) -> Cow<'static, str> {
    NAMED_TOKENS.iter()
        .find(|(ch, _)| *ch == symbol)
        .map(|(_, token)| Cow::Borrowed(*token))
        .unwrap_or_else(|| Cow::Owned(symbol.to_string()))
}


fn token_symbol(token: &str) -> Option<char> {

    if let Some((ch, _)) = NAMED_TOKENS.iter().find(|(_, name)| *name == token) {
        return Some(*ch);
    }

    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None
    }
}


fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}


impl CodeTable<char> {

    /// Renders the table as `"<token>" : "<code>"` lines.
    pub fn serialize(&self) -> String {

        let mut out = String::new();

        for (symbol, code) in self.iter() {
            // Writing into a String cannot fail
            let _ = writeln!(out, "\"{}\"{SEPARATOR}\"{}\"", symbol_token(*symbol), code);
        }

        out
    }


    /// Parses one table line.
    pub fn parse_line(line: &str) -> std::result::Result<(char, BitVec), TableLineError> {

        let (token, code) = line.split_once(SEPARATOR)
            .ok_or(TableLineError::MissingSeparator)?;

        let token = strip_quotes(token.trim());
        let symbol = token_symbol(token)
            .ok_or_else(|| TableLineError::UnrecognisedToken(token.to_string()))?;

        let code = strip_quotes(code.trim());
        if code.is_empty() {
            return Err(TableLineError::InvalidCode(code.to_string()));
        }
        let code = code.parse::<BitVec>()
            .map_err(|_| TableLineError::InvalidCode(code.to_string()))?;

        Ok((symbol, code))
    }


    /// Parses a whole table. Blank lines are ignored; malformed lines are
    /// logged and skipped.
    pub fn parse(text: &str) -> Self {

        let mut table = Self::new();

        for (line_no, line) in text.lines().enumerate() {

            if line.trim().is_empty() {
                continue;
            }

            match Self::parse_line(line) {

                Ok((symbol, code)) => {
                    if let Some(old) = table.insert(symbol, code) {
                        log::warn!("Line {}: symbol {:?} was already mapped to {}, replacing it", line_no + 1, symbol, old);
                    }
                },

                Err(e) => log::warn!("Line {}: skipping {:?}: {}", line_no + 1, line, e),
            }
        }

        table
    }


    pub fn load(path: impl AsRef<Path>) -> Result<Self> {

        let path = path.as_ref();

        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(path, e))?;

        let table = Self::parse(&text);

        log::debug!("Loaded {} codes from {}", table.len(), path.display());

        Ok(table)
    }


    /// Writes the table to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {

        let path = path.as_ref();
        let existed = path.exists();

        fs::write(path, self.serialize())
            .map_err(|e| Error::io(path, e))?;

        if existed {
            log::info!("Table updated: {}", path.display());
        } else {
            log::info!("Table saved: {}", path.display());
        }

        Ok(())
    }

}


#[cfg(test)]
mod tests {

    use std::env;

    use super::*;
    use crate::tree::HuffmanTree;


    fn bits(s: &str) -> BitVec {
        s.parse().unwrap()
    }


    #[test]
    fn serialize_tokens() {

        let table: CodeTable<char> = [
            (' ', bits("00")),
            ('\n', bits("010")),
            ('"', bits("011")),
            ('a', bits("1")),
        ].into_iter().collect();

        assert_eq!(
            table.serialize(),
            "\"new line\" : \"010\"\n\
             \"space\" : \"00\"\n\
             \"\" : \"011\"\n\
             \"a\" : \"1\"\n"
        );
    }


    #[test]
    fn parse_named_tokens() {

        let cases = [
            ("\"space\" : \"0\"", ' '),
            ("\"new line\" : \"0\"", '\n'),
            ("\"tab\" : \"0\"", '\t'),
            ("\"carriage return\" : \"0\"", '\r'),
            ("\"formfeed\" : \"0\"", '\x0C'),
            ("\"\" : \"0\"", '"'),
            ("\"\"\" : \"0\"", '"'),
            ("\":\" : \"0\"", ':'),
            ("\"é\" : \"0\"", 'é'),
        ];

        for (line, expected) in cases {
            assert_eq!(CodeTable::parse_line(line), Ok((expected, bits("0"))), "{line}");
        }
    }


    #[test]
    fn parse_rejects_malformed_lines() {

        assert_eq!(CodeTable::parse_line("\"a\" \"01\""), Err(TableLineError::MissingSeparator));
        assert_eq!(
            CodeTable::parse_line("\"ab\" : \"01\""),
            Err(TableLineError::UnrecognisedToken("ab".to_string()))
        );
        assert_eq!(
            CodeTable::parse_line("\"a\" : \"012\""),
            Err(TableLineError::InvalidCode("012".to_string()))
        );
        assert_eq!(
            CodeTable::parse_line("\"a\" : \"\""),
            Err(TableLineError::InvalidCode(String::new()))
        );
    }


    #[test]
    fn parse_skips_bad_lines() {

        let text = "\"a\" : \"0\"\n\
                    garbage\n\
                    \n\
                    \"bc\" : \"10\"\n\
                    \"c\" : \"11\"\n";

        let table = CodeTable::parse(text);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&'a'), Some(&bits("0")));
        assert_eq!(table.get(&'c'), Some(&bits("11")));
    }


    #[test]
    fn serialize_parse_round_trip() {

        let text = "He said: \"tabs\tand\r\nform\x0Cfeeds\u{0B} and ünïcödé\"\n";
        let table = HuffmanTree::from_text(text.chars()).unwrap().codes();

        assert_eq!(CodeTable::parse(&table.serialize()), table);
    }


    #[test]
    fn prefix_free_check() {

        let good: CodeTable<char> = [('a', bits("0")), ('b', bits("10")), ('c', bits("11"))].into_iter().collect();
        let bad: CodeTable<char> = [('a', bits("1")), ('b', bits("10")), ('c', bits("0"))].into_iter().collect();
        let dup: CodeTable<char> = [('a', bits("1")), ('b', bits("1"))].into_iter().collect();

        assert!(good.is_prefix_free());
        assert!(!bad.is_prefix_free());
        assert!(!dup.is_prefix_free());
        assert_eq!(good.max_code_len(), 2);
    }


    #[test]
    fn save_and_load() {

        let path = env::temp_dir().join(format!("static_huffman_table_{}.txt", std::process::id()));

        let table = HuffmanTree::from_text("mississippi river".chars()).unwrap().codes();

        table.save(&path).unwrap();
        table.save(&path).unwrap();

        let loaded = CodeTable::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded, table);
    }


    #[test]
    fn load_missing_file() {

        let path = env::temp_dir().join("static_huffman_no_such_table.txt");

        assert!(matches!(CodeTable::load(&path), Err(Error::Io { .. })));
    }

}
