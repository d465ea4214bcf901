use html_escape::encode_double_quoted_attribute;

use crate::tag::TagToken;

impl TagToken {
    /// `<div class="box">`
    pub fn opening_markup(&self) -> String {
        let mut out = format!("<{}", self.name);
        for attribute in &self.attributes {
            out.push(' ');
            out.push_str(&attribute.name);
            out.push_str("=\"");
            out.push_str(&encode_double_quoted_attribute(&attribute.value));
            out.push('"');
        }
        out.push('>');
        out
    }

    /// `</div>`
    pub fn closing_markup(&self) -> String {
        format!("</{}>", self.name)
    }
}
