use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! token_types {
    (@parent) => {
        None
    };
    (@parent $parent:ident) => {
        Some(TokenType::$parent)
    };
    ($($variant:ident => $name:literal $(< $parent:ident)?),+ $(,)?) => {
        /// A token category.
        ///
        /// Categories form a tree through their dotted names: `Comment.Single` has `Comment`
        /// as parent. The first entries are structural pseudo-categories that never come out of
        /// a tokenizer but can be styled by a theme.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        pub enum TokenType {
            $(
                #[allow(missing_docs)]
                $variant
            ),+
        }

        impl TokenType {
            /// Every category, in declaration order.
            pub const ALL: &'static [TokenType] = &[$(TokenType::$variant),+];

            /// The dotted name of this category, eg `Literal.String.Double`
            pub const fn name(self) -> &'static str {
                match self {
                    $(TokenType::$variant => $name),+
                }
            }

            /// The category this one falls back to in a theme, if any.
            pub const fn parent(self) -> Option<TokenType> {
                match self {
                    $(TokenType::$variant => token_types!(@parent $($parent)?)),+
                }
            }
        }
    };
}

token_types! {
    Background => "Background",
    PreWrapper => "PreWrapper",
    Line => "Line",
    LineNumbers => "LineNumbers",
    LineNumbersTable => "LineNumbersTable",
    LineHighlight => "LineHighlight",
    LineTable => "LineTable",
    LineTableTD => "LineTableTD",
    LineLink => "LineLink",
    CodeLine => "CodeLine",
    Error => "Error",
    Other => "Other",

    Keyword => "Keyword",
    KeywordConstant => "Keyword.Constant" < Keyword,
    KeywordDeclaration => "Keyword.Declaration" < Keyword,
    KeywordNamespace => "Keyword.Namespace" < Keyword,
    KeywordPseudo => "Keyword.Pseudo" < Keyword,
    KeywordReserved => "Keyword.Reserved" < Keyword,
    KeywordType => "Keyword.Type" < Keyword,

    Name => "Name",
    NameAttribute => "Name.Attribute" < Name,
    NameBuiltin => "Name.Builtin" < Name,
    NameBuiltinPseudo => "Name.Builtin.Pseudo" < NameBuiltin,
    NameClass => "Name.Class" < Name,
    NameConstant => "Name.Constant" < Name,
    NameDecorator => "Name.Decorator" < Name,
    NameEntity => "Name.Entity" < Name,
    NameException => "Name.Exception" < Name,
    NameFunction => "Name.Function" < Name,
    NameFunctionMagic => "Name.Function.Magic" < NameFunction,
    NameKeyword => "Name.Keyword" < Name,
    NameLabel => "Name.Label" < Name,
    NameNamespace => "Name.Namespace" < Name,
    NameOperator => "Name.Operator" < Name,
    NameOther => "Name.Other" < Name,
    NamePseudo => "Name.Pseudo" < Name,
    NameProperty => "Name.Property" < Name,
    NameTag => "Name.Tag" < Name,
    NameVariable => "Name.Variable" < Name,
    NameVariableAnonymous => "Name.Variable.Anonymous" < NameVariable,
    NameVariableClass => "Name.Variable.Class" < NameVariable,
    NameVariableGlobal => "Name.Variable.Global" < NameVariable,
    NameVariableInstance => "Name.Variable.Instance" < NameVariable,
    NameVariableMagic => "Name.Variable.Magic" < NameVariable,

    Literal => "Literal",
    LiteralDate => "Literal.Date" < Literal,
    LiteralOther => "Literal.Other" < Literal,
    LiteralString => "Literal.String" < Literal,
    LiteralStringAffix => "Literal.String.Affix" < LiteralString,
    LiteralStringAtom => "Literal.String.Atom" < LiteralString,
    LiteralStringBacktick => "Literal.String.Backtick" < LiteralString,
    LiteralStringBoolean => "Literal.String.Boolean" < LiteralString,
    LiteralStringChar => "Literal.String.Char" < LiteralString,
    LiteralStringDelimiter => "Literal.String.Delimiter" < LiteralString,
    LiteralStringDoc => "Literal.String.Doc" < LiteralString,
    LiteralStringDouble => "Literal.String.Double" < LiteralString,
    LiteralStringEscape => "Literal.String.Escape" < LiteralString,
    LiteralStringHeredoc => "Literal.String.Heredoc" < LiteralString,
    LiteralStringInterpol => "Literal.String.Interpol" < LiteralString,
    LiteralStringName => "Literal.String.Name" < LiteralString,
    LiteralStringOther => "Literal.String.Other" < LiteralString,
    LiteralStringRegex => "Literal.String.Regex" < LiteralString,
    LiteralStringSingle => "Literal.String.Single" < LiteralString,
    LiteralStringSymbol => "Literal.String.Symbol" < LiteralString,
    LiteralNumber => "Literal.Number" < Literal,
    LiteralNumberBin => "Literal.Number.Bin" < LiteralNumber,
    LiteralNumberByte => "Literal.Number.Byte" < LiteralNumber,
    LiteralNumberFloat => "Literal.Number.Float" < LiteralNumber,
    LiteralNumberHex => "Literal.Number.Hex" < LiteralNumber,
    LiteralNumberInteger => "Literal.Number.Integer" < LiteralNumber,
    LiteralNumberIntegerLong => "Literal.Number.Integer.Long" < LiteralNumberInteger,
    LiteralNumberOct => "Literal.Number.Oct" < LiteralNumber,

    Operator => "Operator",
    OperatorWord => "Operator.Word" < Operator,

    Punctuation => "Punctuation",

    Comment => "Comment",
    CommentHashbang => "Comment.Hashbang" < Comment,
    CommentMultiline => "Comment.Multiline" < Comment,
    CommentSingle => "Comment.Single" < Comment,
    CommentSpecial => "Comment.Special" < Comment,
    CommentPreproc => "Comment.Preproc" < Comment,
    CommentPreprocFile => "Comment.Preproc.File" < CommentPreproc,

    Generic => "Generic",
    GenericDeleted => "Generic.Deleted" < Generic,
    GenericEmph => "Generic.Emph" < Generic,
    GenericError => "Generic.Error" < Generic,
    GenericHeading => "Generic.Heading" < Generic,
    GenericInserted => "Generic.Inserted" < Generic,
    GenericOutput => "Generic.Output" < Generic,
    GenericPrompt => "Generic.Prompt" < Generic,
    GenericStrong => "Generic.Strong" < Generic,
    GenericSubheading => "Generic.Subheading" < Generic,
    GenericTraceback => "Generic.Traceback" < Generic,
    GenericUnderline => "Generic.Underline" < Generic,

    Text => "Text",
    TextWhitespace => "Text.Whitespace" < Text,
    TextSymbol => "Text.Symbol" < Text,
    TextPunctuation => "Text.Punctuation" < Text,
}

impl TokenType {
    /// Iterates over the ancestors of this category, nearest first.
    pub fn ancestors(self) -> impl Iterator<Item = TokenType> {
        std::iter::successors(self.parent(), |tt| tt.parent())
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenType {
    type Err = Error;

    /// Accepts `Comment.Single`, `CommentSingle` as well as the `String` and `Number` shorthands.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "String" => return Ok(TokenType::LiteralString),
            "Number" => return Ok(TokenType::LiteralNumber),
            _ => {}
        }

        TokenType::ALL
            .iter()
            .copied()
            .find(|tt| {
                let name = tt.name();
                name == s
                    || (name.len() == s.len() + name.matches('.').count()
                        && name.split('.').eq(split_camel_case(s)))
            })
            .ok_or_else(|| Error::UnknownTokenType(s.to_string()))
    }
}

/// `LiteralStringDouble` -> `Literal`, `String`, `Double`
fn split_camel_case(s: &str) -> impl Iterator<Item = &str> {
    let mut start = 0;
    let mut bounds = s
        .char_indices()
        .skip(1)
        .filter(|(_, c)| c.is_ascii_uppercase())
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()));

    std::iter::from_fn(move || {
        let end = bounds.next()?;
        let part = &s[start..end];
        start = end;
        Some(part)
    })
}

/// An emitted token: a category and the literal text it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>) -> Self {
        Self {
            token_type,
            value: value.into(),
        }
    }
}

/// A piece of a token that lives on a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub token_type: TokenType,
    pub text: &'a str,
}

/// Splits tokens into lines.
///
/// A token spanning several lines is cut after each `\n`, every piece keeping the category of
/// the token. The newline stays at the end of the line it terminates and empty pieces are dropped,
/// so `N` newline-terminated lines always give `N` lines.
pub fn split_into_lines(tokens: &[Token]) -> Vec<Vec<Fragment<'_>>> {
    let mut lines = Vec::new();
    let mut line = Vec::new();

    for token in tokens {
        for text in token.value.split_inclusive('\n') {
            line.push(Fragment {
                token_type: token.token_type,
                text,
            });
            if text.ends_with('\n') {
                lines.push(std::mem::take(&mut line));
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Turns source text into tokens.
///
/// Implemented by whatever lexer the caller uses; this crate never tokenizes on its own.
pub trait Tokenizer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn tokenize(&self, source: &str) -> Result<Vec<Token>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_discriminants() {
        for (i, tt) in TokenType::ALL.iter().enumerate() {
            assert_eq!(tt.index(), i, "{tt}");
        }
    }

    #[test]
    fn parents_follow_dotted_names() {
        for tt in TokenType::ALL {
            let name = tt.name();
            match tt.parent() {
                Some(parent) => {
                    let (prefix, _) = name.rsplit_once('.').unwrap();
                    assert_eq!(parent.name(), prefix);
                }
                None => assert!(!name.contains('.'), "{name} should have a parent"),
            }
        }
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let ancestors: Vec<_> = TokenType::LiteralNumberIntegerLong.ancestors().collect();
        assert_eq!(
            ancestors,
            vec![
                TokenType::LiteralNumberInteger,
                TokenType::LiteralNumber,
                TokenType::Literal
            ]
        );
        assert_eq!(TokenType::Keyword.ancestors().count(), 0);
    }

    #[test]
    fn can_parse_names() {
        assert_eq!(
            "Comment.Single".parse::<TokenType>().unwrap(),
            TokenType::CommentSingle
        );
        assert_eq!(
            "CommentSingle".parse::<TokenType>().unwrap(),
            TokenType::CommentSingle
        );
        assert_eq!(
            "LiteralStringDouble".parse::<TokenType>().unwrap(),
            TokenType::LiteralStringDouble
        );
        assert_eq!(
            "LineTableTD".parse::<TokenType>().unwrap(),
            TokenType::LineTableTD
        );
        assert_eq!(
            "String".parse::<TokenType>().unwrap(),
            TokenType::LiteralString
        );
        assert_eq!(
            "Number".parse::<TokenType>().unwrap(),
            TokenType::LiteralNumber
        );
        assert!(matches!(
            "Nope".parse::<TokenType>(),
            Err(Error::UnknownTokenType(_))
        ));
    }

    fn texts<'a>(lines: &[Vec<Fragment<'a>>]) -> Vec<Vec<&'a str>> {
        lines
            .iter()
            .map(|l| l.iter().map(|f| f.text).collect())
            .collect()
    }

    #[test]
    fn splits_multiline_tokens() {
        let tokens = vec![
            Token::new(TokenType::Keyword, "package"),
            Token::new(TokenType::Text, " "),
            Token::new(TokenType::NameNamespace, "main"),
            Token::new(TokenType::Text, "\n"),
            Token::new(TokenType::CommentMultiline, "/* a\nb */"),
            Token::new(TokenType::Text, "\n"),
        ];
        let lines = split_into_lines(&tokens);
        assert_eq!(
            texts(&lines),
            vec![
                vec!["package", " ", "main", "\n"],
                vec!["/* a\n"],
                vec!["b */", "\n"],
            ]
        );
        assert_eq!(lines[1][0].token_type, TokenType::CommentMultiline);
        assert_eq!(lines[2][0].token_type, TokenType::CommentMultiline);
    }

    #[test]
    fn keeps_blank_lines_and_unterminated_last_line() {
        let tokens = vec![Token::new(TokenType::Text, "a\n\n\nb")];
        let lines = split_into_lines(&tokens);
        assert_eq!(
            texts(&lines),
            vec![vec!["a\n"], vec!["\n"], vec!["\n"], vec!["b"]]
        );
        assert!(split_into_lines(&[]).is_empty());
        assert!(split_into_lines(&[Token::new(TokenType::Text, "")]).is_empty());
    }
}
