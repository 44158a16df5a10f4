//! FHIR primitive values
//!
//! A primitive field is a [`Primitive<T>`]: an optional typed value plus the
//! element metadata (`id`, `extension`) that travels next to it. The value and
//! the metadata are independent; either may be present without the other.
//!
//! Wire formats hand values over as a [`Scalar`]; each [`PrimitiveType`]
//! decides which scalar tokens it accepts and validates the lexical form.

use super::datatypes::Extension;
use super::error::ConversionError;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use once_cell::sync::Lazy;

/// Namespace every narrative `div` must be declared in.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Wire-neutral scalar token.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    /// A JSON string token.
    String(String),
    /// The lexical form of an XML `value` attribute; every primitive type
    /// parses from it.
    Text(String),
}

impl Scalar {
    /// Token kind, used in error messages.
    pub fn token_name(&self) -> &'static str {
        match self {
            Scalar::Boolean(_) => "boolean",
            Scalar::Integer(_) => "integer",
            Scalar::Decimal(_) => "decimal",
            Scalar::String(_) => "string",
            Scalar::Text(_) => "text",
        }
    }

    /// Lexical form, as written into an XML `value` attribute.
    pub fn to_lexical(&self) -> String {
        match self {
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Decimal(d) => d.to_string(),
            Scalar::String(s) | Scalar::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lexical())
    }
}

/// A FHIR primitive data type.
pub trait PrimitiveType: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// FHIR type name (`boolean`, `dateTime`, ...).
    const TYPE_NAME: &'static str;

    fn from_scalar(scalar: Scalar) -> Result<Self, ConversionError>;

    fn to_scalar(&self) -> Scalar;
}

fn wrong_token(expected: &'static str, found: &Scalar) -> ConversionError {
    ConversionError::WrongToken {
        expected,
        found: found.token_name(),
    }
}

fn invalid(type_name: &'static str, value: impl Into<String>) -> ConversionError {
    ConversionError::InvalidLexical {
        type_name,
        value: value.into(),
    }
}

fn out_of_range(type_name: &'static str, value: impl fmt::Display) -> ConversionError {
    ConversionError::OutOfRange {
        type_name,
        value: value.to_string(),
    }
}

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?([0]|([1-9][0-9]*))$").expect("valid regex"));
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").expect("valid regex")
});
static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").expect("valid regex"));
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s]+( [^\s]+)*$").expect("valid regex"));
static URI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+$").expect("valid regex"));
static BASE64_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*([0-9a-zA-Z\+/=]){4}\s*)+$").expect("valid regex")
});
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1]))?)?$",
    )
    .expect("valid regex")
});
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?$")
        .expect("valid regex")
});

// --- numeric and boolean types ---

impl PrimitiveType for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_scalar(scalar: Scalar) -> Result<Self, ConversionError> {
        match scalar {
            Scalar::Boolean(b) => Ok(b),
            Scalar::Text(text) => match text.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(invalid(Self::TYPE_NAME, text)),
            },
            other => Err(wrong_token(Self::TYPE_NAME, &other)),
        }
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Boolean(*self)
    }
}

fn parse_integer_text(type_name: &'static str, text: &str) -> Result<i64, ConversionError> {
    if !INTEGER_RE.is_match(text) {
        return Err(invalid(type_name, text));
    }
    text.parse::<i64>().map_err(|_| out_of_range(type_name, text))
}

fn integer_from_scalar(type_name: &'static str, scalar: Scalar) -> Result<i64, ConversionError> {
    match scalar {
        Scalar::Integer(i) => Ok(i),
        Scalar::Text(text) => parse_integer_text(type_name, &text),
        other => Err(wrong_token("integer", &other)),
    }
}

impl PrimitiveType for i32 {
    const TYPE_NAME: &'static str = "integer";

    fn from_scalar(scalar: Scalar) -> Result<Self, ConversionError> {
        let value = integer_from_scalar(Self::TYPE_NAME, scalar)?;
        i32::try_from(value).map_err(|_| out_of_range(Self::TYPE_NAME, value))
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Integer(i64::from(*self))
    }
}

/// `unsignedInt`: 0 ..= 2,147,483,647
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnsignedInt(u32);

impl UnsignedInt {
    pub fn new(value: u32) -> Result<Self, ConversionError> {
        if value > i32::MAX as u32 {
            return Err(out_of_range("unsignedInt", value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl PrimitiveType for UnsignedInt {
    const TYPE_NAME: &'static str = "unsignedInt";

    fn from_scalar(scalar: Scalar) -> Result<Self, ConversionError> {
        let value = integer_from_scalar(Self::TYPE_NAME, scalar)?;
        let value = u32::try_from(value).map_err(|_| out_of_range(Self::TYPE_NAME, value))?;
        Self::new(value)
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Integer(i64::from(self.0))
    }
}

/// `positiveInt`: 1 ..= 2,147,483,647
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositiveInt(u32);

impl PositiveInt {
    pub fn new(value: u32) -> Result<Self, ConversionError> {
        if value == 0 || value > i32::MAX as u32 {
            return Err(out_of_range("positiveInt", value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl PrimitiveType for PositiveInt {
    const TYPE_NAME: &'static str = "positiveInt";

    fn from_scalar(scalar: Scalar) -> Result<Self, ConversionError> {
        let value = integer_from_scalar(Self::TYPE_NAME, scalar)?;
        let value = u32::try_from(value).map_err(|_| out_of_range(Self::TYPE_NAME, value))?;
        Self::new(value)
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Integer(i64::from(self.0))
    }
}

/// Decimals keep their scale (`1.50` stays `1.50`).
impl PrimitiveType for Decimal {
    const TYPE_NAME: &'static str = "decimal";

    fn from_scalar(scalar: Scalar) -> Result<Self, ConversionError> {
        match scalar {
            Scalar::Decimal(d) => Ok(d),
            Scalar::Integer(i) => Ok(Decimal::from(i)),
            Scalar::Text(text) => parse_decimal(&text),
            other => Err(wrong_token(Self::TYPE_NAME, &other)),
        }
    }

    fn to_scalar(&self) -> Scalar {
        Scalar::Decimal(*self)
    }
}

/// Parses the FHIR decimal lexical form, including exponent notation.
pub fn parse_decimal(text: &str) -> Result<Decimal, ConversionError> {
    if !DECIMAL_RE.is_match(text) {
        return Err(invalid("decimal", text));
    }
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text)
    };
    parsed.map_err(|_| out_of_range("decimal", text))
}

// --- string-based types ---

macro_rules! string_primitive {
    ($(#[$meta:meta])* $name:ident, $type_name:literal, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, ConversionError> {
                let value = value.into();
                if $validate(&value) {
                    Ok(Self(value))
                } else {
                    Err(invalid($type_name, value))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl PrimitiveType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn from_scalar(scalar: Scalar) -> Result<Self, ConversionError> {
                match scalar {
                    Scalar::String(value) | Scalar::Text(value) => Self::new(value),
                    other => Err(wrong_token("string", &other)),
                }
            }

            fn to_scalar(&self) -> Scalar {
                Scalar::String(self.0.clone())
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

fn is_non_empty(value: &str) -> bool {
    !value.is_empty()
}

fn is_code(value: &str) -> bool {
    CODE_RE.is_match(value)
}

fn is_id(value: &str) -> bool {
    ID_RE.is_match(value)
}

fn is_uri(value: &str) -> bool {
    URI_RE.is_match(value)
}

fn is_base64(value: &str) -> bool {
    BASE64_RE.is_match(value)
}

/// A single `div` root in the XHTML namespace and nothing around it.
fn is_xhtml(value: &str) -> bool {
    if value.trim_start().starts_with("<?") {
        return false;
    }
    let Ok(doc) = roxmltree::Document::parse(value) else {
        return false;
    };
    let root = doc.root();
    let div = doc.root_element();
    root.children().count() == 1
        && div.tag_name().name() == "div"
        && div.tag_name().namespace() == Some(XHTML_NS)
}

fn is_date(value: &str) -> bool {
    if !DATE_RE.is_match(value) {
        return false;
    }
    // Partial dates (YYYY, YYYY-MM) are valid; full dates must exist in the calendar.
    value.len() < 10 || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_date_time(value: &str) -> bool {
    match value.split_once('T') {
        Some(_) => chrono::DateTime::parse_from_rfc3339(value).is_ok(),
        None => is_date(value),
    }
}

fn is_instant(value: &str) -> bool {
    value.contains('T') && chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

fn is_time(value: &str) -> bool {
    TIME_RE.is_match(value) && chrono::NaiveTime::parse_from_str(value, "%H:%M:%S%.f").is_ok()
}

string_primitive!(
    /// `string`: a sequence of Unicode characters
    FhirString,
    "string",
    is_non_empty
);
string_primitive!(Markdown, "markdown", is_non_empty);
string_primitive!(
    /// `code`: a token with no leading/trailing or repeated internal whitespace
    Code,
    "code",
    is_code
);
string_primitive!(Id, "id", is_id);
string_primitive!(Uri, "uri", is_uri);
string_primitive!(Url, "url", is_uri);
string_primitive!(Canonical, "canonical", is_uri);
string_primitive!(Base64Binary, "base64Binary", is_base64);
string_primitive!(
    /// `date`: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    Date,
    "date",
    is_date
);
string_primitive!(
    /// `dateTime`: a partial date, or a full timestamp with a zone offset
    DateTime,
    "dateTime",
    is_date_time
);
string_primitive!(Instant, "instant", is_instant);
string_primitive!(Time, "time", is_time);
string_primitive!(
    /// Limited XHTML content of `Narrative.div`, kept verbatim
    Xhtml,
    "xhtml",
    is_xhtml
);

impl Date {
    /// The calendar date, when the value has day precision.
    pub fn to_naive_date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }
}

impl DateTime {
    /// The timestamp, when the value carries a time part.
    pub fn to_chrono(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(&self.0).ok()
    }
}

impl Instant {
    pub fn to_chrono(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc3339(&self.0).ok()
    }
}

// --- the primitive container ---

/// A primitive field: value plus element metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive<T> {
    pub value: Option<T>,
    pub id: Option<String>,
    pub extension: Vec<Extension>,
}

impl<T> Default for Primitive<T> {
    fn default() -> Self {
        Self {
            value: None,
            id: None,
            extension: Vec::new(),
        }
    }
}

impl<T> From<T> for Primitive<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Primitive<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(value),
            id: None,
            extension: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension.push(extension);
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn has_metadata(&self) -> bool {
        self.id.is_some() || !self.extension.is_empty()
    }

    /// `true` when neither value nor metadata is present; the field is then
    /// omitted on the wire.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && !self.has_metadata()
    }
}

impl<T: PrimitiveType> Primitive<T> {
    /// Builds a primitive from its lexical form.
    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        T::from_scalar(Scalar::Text(text.to_string())).map(Self::new)
    }
}

/// Read access to any primitive, independent of its value type.
pub trait PrimitiveNode: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;

    fn scalar(&self) -> Option<Scalar>;

    fn id(&self) -> Option<&String>;

    fn extensions(&self) -> &[Extension];

    fn has_value(&self) -> bool {
        self.scalar().is_some()
    }

    fn has_metadata(&self) -> bool {
        self.id().is_some() || !self.extensions().is_empty()
    }

    fn is_empty(&self) -> bool {
        !self.has_value() && !self.has_metadata()
    }
}

/// Write access used by the decoders.
pub trait PrimitiveSlot: PrimitiveNode {
    fn set_scalar(&mut self, scalar: Scalar) -> Result<(), ConversionError>;

    fn set_id(&mut self, id: String);

    fn extensions_mut(&mut self) -> &mut Vec<Extension>;
}

impl<T: PrimitiveType> PrimitiveNode for Primitive<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn scalar(&self) -> Option<Scalar> {
        self.value.as_ref().map(PrimitiveType::to_scalar)
    }

    fn id(&self) -> Option<&String> {
        self.id.as_ref()
    }

    fn extensions(&self) -> &[Extension] {
        &self.extension
    }

    fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

impl<T: PrimitiveType> PrimitiveSlot for Primitive<T> {
    fn set_scalar(&mut self, scalar: Scalar) -> Result<(), ConversionError> {
        self.value = Some(T::from_scalar(scalar)?);
        Ok(())
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn extensions_mut(&mut self) -> &mut Vec<Extension> {
        &mut self.extension
    }
}

/// Plain strings (`Element.id`, `Extension.url`) navigate as system strings.
impl PrimitiveNode for String {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::String(self.clone()))
    }

    fn id(&self) -> Option<&String> {
        None
    }

    fn extensions(&self) -> &[Extension] {
        &[]
    }

    fn has_value(&self) -> bool {
        true
    }
}
