//! XPath matcher over the raw body parsed as lenient XML (spec §4.1
//! "XPath").

use sxd_document::parser;
use sxd_xpath::{Context, Factory, Value as XPathValue};

pub fn matches(actual_xml: &str, expr: &str) -> bool {
    let package = match parser::parse(actual_xml) {
        Ok(package) => package,
        Err(_) => return false,
    };
    let document = package.as_document();

    let xpath = match Factory::new().build(expr) {
        Ok(Some(xpath)) => xpath,
        _ => return false,
    };

    let context = Context::new();
    match xpath.evaluate(&context, document.root()) {
        Ok(XPathValue::Nodeset(nodes)) => nodes.size() > 0,
        Ok(XPathValue::Boolean(b)) => b,
        _ => false,
    }
}
