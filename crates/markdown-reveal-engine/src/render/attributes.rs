//! Namespace-aware translation of DOM property names to attribute names.
//!
//! Documents carry properties (`className`, `htmlFor`, `strokeWidth`) while
//! output nodes carry attributes (`class`, `for`, `stroke-width`). The
//! mapping depends on whether the element sits inside an SVG subtree: SVG
//! keeps case-sensitive names such as `viewBox` and hyphenates presentation
//! properties, HTML lowercases its camel-cased properties.
//!
//! Unknown names pass through unchanged.

use crate::document::{Attributes, PropertyMap};

/// Which attribute vocabulary applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
}

impl Namespace {
    pub fn for_svg(svg: bool) -> Self {
        if svg { Namespace::Svg } else { Namespace::Html }
    }
}

const SHARED_RENAMES: &[(&str, &str)] = &[("className", "class")];

const HTML_RENAMES: &[(&str, &str)] = &[
    ("htmlFor", "for"),
    ("httpEquiv", "http-equiv"),
    ("acceptCharset", "accept-charset"),
];

const SVG_RENAMES: &[(&str, &str)] = &[
    ("xLinkActuate", "xlink:actuate"),
    ("xLinkArcRole", "xlink:arcrole"),
    ("xLinkHref", "xlink:href"),
    ("xLinkRole", "xlink:role"),
    ("xLinkShow", "xlink:show"),
    ("xLinkTitle", "xlink:title"),
    ("xLinkType", "xlink:type"),
    ("xmlBase", "xml:base"),
    ("xmlLang", "xml:lang"),
    ("xmlSpace", "xml:space"),
    ("xmlnsXLink", "xmlns:xlink"),
    ("tabIndex", "tabindex"),
];

/// HTML properties whose attribute is the lowercased property name.
const HTML_LOWERCASED: &[&str] = &[
    "accessKey",
    "allowFullScreen",
    "autoCapitalize",
    "autoComplete",
    "autoFocus",
    "autoPlay",
    "cellPadding",
    "cellSpacing",
    "charSet",
    "colSpan",
    "contentEditable",
    "crossOrigin",
    "dateTime",
    "encType",
    "enterKeyHint",
    "formAction",
    "formEncType",
    "formMethod",
    "formNoValidate",
    "formTarget",
    "frameBorder",
    "hrefLang",
    "inputMode",
    "itemId",
    "itemProp",
    "itemRef",
    "itemScope",
    "itemType",
    "maxLength",
    "minLength",
    "noModule",
    "noValidate",
    "playsInline",
    "readOnly",
    "referrerPolicy",
    "rowSpan",
    "spellCheck",
    "srcDoc",
    "srcLang",
    "srcSet",
    "tabIndex",
    "useMap",
];

/// SVG presentation properties written hyphenated.
const SVG_HYPHENATED: &[&str] = &[
    "alignmentBaseline",
    "baselineShift",
    "clipPath",
    "clipRule",
    "colorInterpolation",
    "colorInterpolationFilters",
    "dominantBaseline",
    "fillOpacity",
    "fillRule",
    "floodColor",
    "floodOpacity",
    "fontFamily",
    "fontSize",
    "fontStretch",
    "fontStyle",
    "fontVariant",
    "fontWeight",
    "imageRendering",
    "letterSpacing",
    "lightingColor",
    "markerEnd",
    "markerMid",
    "markerStart",
    "paintOrder",
    "pointerEvents",
    "shapeRendering",
    "stopColor",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeLinecap",
    "strokeLinejoin",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
    "textAnchor",
    "textDecoration",
    "textRendering",
    "transformOrigin",
    "vectorEffect",
    "wordSpacing",
    "writingMode",
];

fn lookup(table: &[(&str, &'static str)], property: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, attribute)| *attribute)
}

/// `fooBarBaz` -> `foo-bar-baz`
fn hyphenate(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `ariaLabel`/`dataFooBar` style properties, which map the same in both namespaces.
fn prefixed(property: &str) -> Option<String> {
    for prefix in ["aria", "data"] {
        if let Some(rest) = property.strip_prefix(prefix)
            && rest
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Some(format!("{prefix}{}", hyphenate(rest)));
        }
    }
    None
}

/// Attribute name for a property in the given namespace.
pub fn attribute_name(namespace: Namespace, property: &str) -> String {
    if let Some(attribute) = lookup(SHARED_RENAMES, property) {
        return attribute.to_string();
    }
    if let Some(attribute) = prefixed(property) {
        return attribute;
    }
    match namespace {
        Namespace::Html => {
            if let Some(attribute) = lookup(HTML_RENAMES, property) {
                attribute.to_string()
            } else if HTML_LOWERCASED.contains(&property) {
                property.to_ascii_lowercase()
            } else {
                property.to_string()
            }
        }
        Namespace::Svg => {
            if let Some(attribute) = lookup(SVG_RENAMES, property) {
                attribute.to_string()
            } else if SVG_HYPHENATED.contains(&property) {
                hyphenate(property)
            } else {
                property.to_string()
            }
        }
    }
}

/// Translate a whole property map, keeping order.
pub fn translate(namespace: Namespace, properties: &PropertyMap) -> Attributes {
    properties
        .iter()
        .map(|(name, value)| (attribute_name(namespace, name), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Namespace::Html, "className", "class")]
    #[case(Namespace::Html, "htmlFor", "for")]
    #[case(Namespace::Html, "tabIndex", "tabindex")]
    #[case(Namespace::Html, "ariaLabel", "aria-label")]
    #[case(Namespace::Html, "dataLineNumber", "data-line-number")]
    #[case(Namespace::Html, "href", "href")]
    #[case(Namespace::Html, "strokeWidth", "strokeWidth")]
    #[case(Namespace::Html, "slot-name", "slot-name")]
    #[case(Namespace::Svg, "className", "class")]
    #[case(Namespace::Svg, "viewBox", "viewBox")]
    #[case(Namespace::Svg, "strokeWidth", "stroke-width")]
    #[case(Namespace::Svg, "xLinkHref", "xlink:href")]
    #[case(Namespace::Svg, "ariaHidden", "aria-hidden")]
    fn maps_property_names(
        #[case] namespace: Namespace,
        #[case] property: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(attribute_name(namespace, property), expected);
    }

    #[test]
    fn bare_prefix_is_not_treated_as_data_attribute() {
        assert_eq!(attribute_name(Namespace::Html, "data"), "data");
        assert_eq!(attribute_name(Namespace::Html, "database"), "database");
    }

    #[test]
    fn translate_keeps_order() {
        let props: PropertyMap = [("id", "x"), ("className", "y")].into_iter().collect();
        let attrs = translate(Namespace::Html, &props);
        let names: Vec<_> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["id", "class"]);
    }
}
