//! Tea-syntax recursive-descent parser, spec §4.2/§6. Grammar:
//! `#and-not(A,B) · #and[combiner](A,…) · #or[combiner](A,…) ·
//! #scale[f](A) · #freetext[match,lang,scale,max](text) ·
//! #wordlist[n](#word[…](w), …) · #syn(A,…) · #term[match,calc,lang](text)
//! · #location[p](A) · #end[p](A) · #window[lo,hi,o|u](A,…)`.
//! `[ ] ( ) ,` are delimiters; `\` escapes. Unknown commands produce
//! `WrongParameter` with the unconsumed pointer echoed (spec §6).

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::char,
    combinator::opt,
    sequence::delimited,
    IResult,
};

use crate::core::error::{Error, ErrorKind, Result};

/// Parsed, uninterpreted tea-syntax tree. `Query::build` resolves the
/// leaf commands (`Term`/`FreeText`/`Word`/`Syn`) against an index to
/// produce the runtime `OperatorNode` tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TeaNode {
    AndNot(Box<TeaNode>, Box<TeaNode>),
    And { combiner: String, children: Vec<TeaNode> },
    Or { combiner: String, children: Vec<TeaNode> },
    Scale(f64, Box<TeaNode>),
    FreeText { match_mode: char, lang: Option<String>, scale: f64, max: Option<usize>, text: String },
    WordList { n: usize, words: Vec<TeaNode> },
    Word { match_mode: Option<char>, text: String },
    Syn(Vec<TeaNode>),
    Term { match_mode: char, calc: Option<String>, lang: Option<String>, text: String },
    Location(f64, Box<TeaNode>),
    End(f64, Box<TeaNode>),
    Window { lo: f64, hi: f64, mode: char, children: Vec<TeaNode> },
}

pub fn parse(input: &str) -> Result<TeaNode> {
    let (node, rest) = parse_node(input.trim())?;
    let rest = rest.trim_start();
    if !rest.is_empty() {
        return Err(wrong_parameter(input, rest));
    }
    Ok(node)
}

fn wrong_parameter(original: &str, unconsumed: &str) -> Error {
    Error::new(ErrorKind::WrongParameter, format!("tea syntax error, unconsumed: `{unconsumed}` (in `{original}`)"))
}

fn command_name(input: &str) -> IResult<&str, &str> {
    nom::sequence::preceded(char('#'), take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'))(input)
}

fn bracket_params(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        char('['),
        nom::multi::separated_list0(
            char(','),
            nom::combinator::map(take_while(|c: char| c != ',' && c != ']'), |s: &str| s.to_string()),
        ),
        char(']'),
    )(input)
}

/// Consume escaped text up to (but not including) the next unescaped
/// `,` or `)`. `\\` escapes the following character (spec §4.2:
/// "backslash-escaping inside the payload text is mandatory").
fn escaped_text(input: &str) -> (String, &str) {
    let mut out = String::new();
    let mut chars = input.char_indices().peekable();
    let mut consumed = 0usize;
    while let Some(&(i, c)) = chars.peek() {
        if c == '\\' {
            chars.next();
            if let Some(&(_, escaped)) = chars.peek() {
                out.push(escaped);
                chars.next();
                consumed = i + c.len_utf8() + escaped.len_utf8();
                continue;
            }
            consumed = i + c.len_utf8();
            break;
        }
        if c == ',' || c == ')' {
            break;
        }
        out.push(c);
        chars.next();
        consumed = i + c.len_utf8();
    }
    (out, &input[consumed..])
}

fn expect(input: &str, c: char, original: &str) -> Result<&str> {
    let trimmed = input.trim_start();
    trimmed.strip_prefix(c).ok_or_else(|| wrong_parameter(original, trimmed))
}

fn parse_f64(params: &[String], index: usize, original: &str) -> Result<f64> {
    params
        .get(index)
        .ok_or_else(|| wrong_parameter(original, ""))?
        .parse::<f64>()
        .map_err(|_| wrong_parameter(original, params.get(index).map(String::as_str).unwrap_or("")))
}

fn parse_list(mut input: &str, original: &str) -> Result<(Vec<TeaNode>, &str)> {
    let mut nodes = Vec::new();
    loop {
        let (node, rest) = parse_node(input)?;
        nodes.push(node);
        let rest = rest.trim_start();
        if let Some(stripped) = rest.strip_prefix(',') {
            input = stripped.trim_start();
            continue;
        }
        input = rest;
        break;
    }
    let _ = original;
    Ok((nodes, input))
}

fn parse_node(input: &str) -> Result<(TeaNode, &str)> {
    let original = input;
    let (rest, name) = command_name(input).map_err(|_| wrong_parameter(original, input))?;
    let (params, rest) = match bracket_params(rest) {
        Ok((r, p)) => (p, r),
        Err(_) => (Vec::new(), rest),
    };

    match name {
        "and-not" => {
            let rest = expect(rest, '(', original)?;
            let (children, rest) = parse_list(rest, original)?;
            let rest = expect(rest, ')', original)?;
            if children.len() != 2 {
                return Err(wrong_parameter(original, "and-not requires exactly two operands"));
            }
            let mut it = children.into_iter();
            let a = it.next().unwrap();
            let b = it.next().unwrap();
            Ok((TeaNode::AndNot(Box::new(a), Box::new(b)), rest))
        }
        "and" => {
            let rest = expect(rest, '(', original)?;
            let (children, rest) = parse_list(rest, original)?;
            let rest = expect(rest, ')', original)?;
            Ok((TeaNode::And { combiner: params.into_iter().next().unwrap_or_default(), children }, rest))
        }
        "or" => {
            let rest = expect(rest, '(', original)?;
            let (children, rest) = parse_list(rest, original)?;
            let rest = expect(rest, ')', original)?;
            Ok((TeaNode::Or { combiner: params.into_iter().next().unwrap_or_default(), children }, rest))
        }
        "scale" => {
            let f = parse_f64(&params, 0, original)?;
            let rest = expect(rest, '(', original)?;
            let (child, rest) = parse_node(rest)?;
            let rest = expect(rest, ')', original)?;
            Ok((TeaNode::Scale(f, Box::new(child)), rest))
        }
        "freetext" => {
            let rest = expect(rest, '(', original)?;
            let (text, rest) = escaped_text(rest);
            let rest = expect(rest, ')', original)?;
            let match_mode = params.first().and_then(|s| s.chars().next()).unwrap_or('m');
            let lang = params.get(1).filter(|s| !s.is_empty()).cloned();
            let scale = params.get(2).and_then(|s| s.parse().ok()).unwrap_or(1.0);
            let max = params.get(3).and_then(|s| s.parse().ok());
            Ok((TeaNode::FreeText { match_mode, lang, scale, max, text }, rest))
        }
        "wordlist" => {
            let rest = expect(rest, '(', original)?;
            let (words, rest) = parse_list(rest, original)?;
            let rest = expect(rest, ')', original)?;
            let n = params.first().and_then(|s| s.parse().ok()).unwrap_or(words.len());
            Ok((TeaNode::WordList { n, words }, rest))
        }
        "word" => {
            let rest = expect(rest, '(', original)?;
            let (text, rest) = escaped_text(rest);
            let rest = expect(rest, ')', original)?;
            let match_mode = params.first().and_then(|s| s.chars().next());
            Ok((TeaNode::Word { match_mode, text }, rest))
        }
        "syn" => {
            let rest = expect(rest, '(', original)?;
            let (children, rest) = parse_list(rest, original)?;
            let rest = expect(rest, ')', original)?;
            Ok((TeaNode::Syn(children), rest))
        }
        "term" => {
            let rest = expect(rest, '(', original)?;
            let (text, rest) = escaped_text(rest);
            let rest = expect(rest, ')', original)?;
            let match_mode = params.first().and_then(|s| s.chars().next()).unwrap_or('e');
            let calc = params.get(1).filter(|s| !s.is_empty()).cloned();
            let lang = params.get(2).filter(|s| !s.is_empty()).cloned();
            Ok((TeaNode::Term { match_mode, calc, lang, text }, rest))
        }
        "location" => {
            let p = parse_f64(&params, 0, original)?;
            let rest = expect(rest, '(', original)?;
            let (child, rest) = parse_node(rest)?;
            let rest = expect(rest, ')', original)?;
            Ok((TeaNode::Location(p, Box::new(child)), rest))
        }
        "end" => {
            let p = parse_f64(&params, 0, original)?;
            let rest = expect(rest, '(', original)?;
            let (child, rest) = parse_node(rest)?;
            let rest = expect(rest, ')', original)?;
            Ok((TeaNode::End(p, Box::new(child)), rest))
        }
        "window" => {
            let lo = parse_f64(&params, 0, original)?;
            let hi = parse_f64(&params, 1, original)?;
            let mode = params.get(2).and_then(|s| s.chars().next()).unwrap_or('o');
            let rest = expect(rest, '(', original)?;
            let (children, rest) = parse_list(rest, original)?;
            let rest = expect(rest, ')', original)?;
            Ok((TeaNode::Window { lo, hi, mode, children }, rest))
        }
        other => Err(Error::new(ErrorKind::WrongParameter, format!("unknown tea command #{other}, at: `{original}`"))),
    }
}

/// Sanity check that `tag` is actually reachable from this module, kept
/// deliberately trivial — every other token boundary here is hand-rolled
/// since the grammar's escaping rules don't map cleanly onto nom's
/// built-in escaped-string combinators.
#[allow(dead_code)]
fn literal_hash(input: &str) -> IResult<&str, &str> {
    tag("#")(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_not_of_two_terms() {
        let tree = parse(r"#and-not(#term[e,,ja](x),#term[e,,ja](y))").unwrap();
        match tree {
            TeaNode::AndNot(a, b) => {
                assert!(matches!(*a, TeaNode::Term { ref text, .. } if text == "x"));
                assert!(matches!(*b, TeaNode::Term { ref text, .. } if text == "y"));
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn parses_scale_and_or_with_combiner() {
        let tree = parse(r"#scale[2.5](#or[max](#term[e](a),#term[e](b)))").unwrap();
        match tree {
            TeaNode::Scale(f, inner) => {
                assert_eq!(f, 2.5);
                assert!(matches!(*inner, TeaNode::Or { ref combiner, .. } if combiner == "max"));
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn escapes_commas_and_parens_in_payload_text() {
        let tree = parse(r"#term[e](a\,b\)c)").unwrap();
        match tree {
            TeaNode::Term { text, .. } => assert_eq!(text, "a,b)c"),
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn unknown_command_is_wrong_parameter_with_pointer() {
        let err = parse("#bogus(x)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::WrongParameter);
        assert!(err.context.contains("#bogus(x)"));
    }

    #[test]
    fn round_trip_preserves_tree_shape() {
        let original = r"#and-not(#term[e,,ja](x),#term[e,,ja](y))";
        let tree = parse(original).unwrap();
        let rebuilt = render(&tree);
        let reparsed = parse(&rebuilt).unwrap();
        assert_eq!(tree, reparsed);
    }

    fn render(node: &TeaNode) -> String {
        match node {
            TeaNode::AndNot(a, b) => format!("#and-not({},{})", render(a), render(b)),
            TeaNode::And { combiner, children } => {
                format!("#and[{combiner}]({})", children.iter().map(render).collect::<Vec<_>>().join(","))
            }
            TeaNode::Or { combiner, children } => {
                format!("#or[{combiner}]({})", children.iter().map(render).collect::<Vec<_>>().join(","))
            }
            TeaNode::Scale(f, child) => format!("#scale[{f}]({})", render(child)),
            TeaNode::FreeText { match_mode, lang, scale, max, text } => format!(
                "#freetext[{match_mode},{},{scale},{}]({text})",
                lang.clone().unwrap_or_default(),
                max.map(|m| m.to_string()).unwrap_or_default()
            ),
            TeaNode::WordList { n, words } => format!("#wordlist[{n}]({})", words.iter().map(render).collect::<Vec<_>>().join(",")),
            TeaNode::Word { match_mode, text } => {
                format!("#word[{}]({text})", match_mode.map(|c| c.to_string()).unwrap_or_default())
            }
            TeaNode::Syn(children) => format!("#syn({})", children.iter().map(render).collect::<Vec<_>>().join(",")),
            TeaNode::Term { match_mode, calc, lang, text } => format!(
                "#term[{match_mode},{},{}]({text})",
                calc.clone().unwrap_or_default(),
                lang.clone().unwrap_or_default()
            ),
            TeaNode::Location(p, child) => format!("#location[{p}]({})", render(child)),
            TeaNode::End(p, child) => format!("#end[{p}]({})", render(child)),
            TeaNode::Window { lo, hi, mode, children } => {
                format!("#window[{lo},{hi},{mode}]({})", children.iter().map(render).collect::<Vec<_>>().join(","))
            }
        }
    }
}
