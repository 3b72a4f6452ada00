//! Token classification — decides what kind of fragment a token is, and
//! whether it could be part of an employer name.

use once_cell::sync::Lazy;
use regex::Regex;

use cnis_core::HeuristicConfig;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").unwrap());

static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,3}(\.[0-9]{3})*,[0-9]{2}$").unwrap());

/// Administrative vocabulary of the statement: column captions, filiation
/// categories, section titles and identification labels.
pub const IGNORED_TERMS: &[&str] = &[
    "EMPREGADO", "TRABALHADOR", "AVULSO", "CONTRIBUINTE", "INDIVIDUAL",
    "FACULTATIVO", "DOMÉSTICO", "SEGURADO", "ESPECIAL", "AGENTE", "PÚBLICO",
    "REMUNERAÇÃO", "VÍNCULOS", "PERÍODOS", "DADOS", "CADASTRAIS",
    "RELAÇÕES", "PREVIDENCIÁRIAS", "NIT", "PÁGINA", "SEQ", "CNIS",
    "DATA", "INÍCIO", "FIM", "TIPO", "FILIAÇÃO", "VÍNCULO",
    "REMUNERAÇÕES", "INDICADORES", "COMPETÊNCIA", "SALÁRIO",
    "BENEFÍCIO", "ESPÉCIE", "RECOLHIMENTOS", "VALOR", "TOTAL",
    "NASCIMENTO", "DN", "NAT", "IDENTIFICAÇÃO", "NOME",
];

/// Labels that mark a nearby date as identification metadata.
pub const HEADER_MARKERS: &[&str] = &["NASCIMENTO", "DN", "NAT", "NIT", "CPF"];

/// Substrings that reveal an assembled name as header text.
pub const NAME_REJECT_MARKERS: &[&str] = &["NOME:", "FILIADO", "SEGURADO", "IDENTIFICAÇÃO"];

/// Prefixes that reveal an assembled name as an identification label.
pub const NAME_REJECT_PREFIXES: &[&str] = &["NIT", "CPF"];

static IGNORED_FOLDED: Lazy<Vec<String>> = Lazy::new(|| fold_all(IGNORED_TERMS));
static HEADER_FOLDED: Lazy<Vec<String>> = Lazy::new(|| fold_all(HEADER_MARKERS));
static REJECT_FOLDED: Lazy<Vec<String>> = Lazy::new(|| fold_all(NAME_REJECT_MARKERS));
static PREFIX_FOLDED: Lazy<Vec<String>> = Lazy::new(|| fold_all(NAME_REJECT_PREFIXES));

fn fold_all(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| normalize(t)).collect()
}

/// Category of a single token, inferred from its text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Date,
    DocumentNumber,
    MonetaryAmount,
    /// Administrative vocabulary, stray punctuation, or (optionally) bare numbers.
    Noise,
    /// Anything that could belong to an employer name.
    Text,
}

/// Upper-case a token and strip Portuguese diacritics.
pub fn normalize(token: &str) -> String {
    token
        .trim()
        .to_uppercase()
        .chars()
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ç' => 'C',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// `DD/MM/YYYY`, nothing else.
pub fn is_date(token: &str) -> bool {
    DATE_RE.is_match(token)
}

/// A formatted 11- or 14-digit registration number (CPF, NIT, CNPJ).
pub fn is_document_number(token: &str) -> bool {
    let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
    (digits == 11 || digits == 14) && token.contains(['.', '/', '-'])
}

/// Regional currency format, e.g. `1.234,56`.
pub fn is_monetary_amount(token: &str) -> bool {
    CURRENCY_RE.is_match(token)
}

/// Whether a token (already normalized) contains an identification header label.
pub fn is_header_marker(normalized: &str) -> bool {
    HEADER_FOLDED.iter().any(|m| normalized.contains(m.as_str()))
}

/// Whether an assembled name is really header text.
pub fn is_rejected_name(name: &str) -> bool {
    let upper = normalize(name);
    REJECT_FOLDED.iter().any(|m| upper.contains(m.as_str()))
        || PREFIX_FOLDED.iter().any(|p| upper.starts_with(p.as_str()))
}

/// Default-policy shorthand for [`Classifier::should_ignore`].
pub fn should_ignore(token: &str) -> bool {
    Classifier::default().should_ignore(token)
}

/// Token classifier carrying the optional noise rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    ignore_bare_numbers: bool,
}

impl Classifier {
    pub fn new(config: &HeuristicConfig) -> Self {
        Self {
            ignore_bare_numbers: config.ignore_bare_numbers,
        }
    }

    pub fn kind(&self, token: &str) -> TokenKind {
        if is_date(token) {
            return TokenKind::Date;
        }
        if is_document_number(token) {
            return TokenKind::DocumentNumber;
        }
        if is_monetary_amount(token) {
            return TokenKind::MonetaryAmount;
        }

        let upper = normalize(token);
        if upper.chars().count() < 2 {
            return TokenKind::Noise;
        }
        if IGNORED_FOLDED.iter().any(|term| upper.contains(term.as_str())) {
            return TokenKind::Noise;
        }
        if self.ignore_bare_numbers && is_bare_number(token) {
            return TokenKind::Noise;
        }
        TokenKind::Text
    }

    /// The single gate deciding whether a token may be (part of) an employer name.
    pub fn should_ignore(&self, token: &str) -> bool {
        self.kind(token) != TokenKind::Text
    }
}

fn is_bare_number(token: &str) -> bool {
    let mut alnum = token.chars().filter(|c| c.is_ascii_alphanumeric()).peekable();
    alnum.peek().is_some() && alnum.all(|c| c.is_ascii_digit())
}
