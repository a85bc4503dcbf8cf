use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

use crate::translation::error::{TranslationError, TranslationResult};

/// 序列化文档
///
/// `document_encoding` 非空且可识别时，输出按该编码重新编码。
pub fn serialize_document(dom: &RcDom, document_encoding: &str) -> TranslationResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| TranslationError::SerializationError(format!("DOM序列化失败: {}", e)))?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;

    #[test]
    fn round_trips_markup() {
        let html = "<html><head></head><body><a data-translate=\"HOME\">HOME</a></body></html>";
        let dom = html_to_dom(html.as_bytes(), "utf-8").unwrap();

        let out = serialize_document(&dom, "utf-8").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), html);
    }

    #[test]
    fn re_encodes_output() {
        let dom = html_to_dom("<p>Paramètres</p>".as_bytes(), "utf-8").unwrap();

        let out = serialize_document(&dom, "windows-1252").unwrap();
        assert!(out.contains(&0xE8));
        assert!(!out.windows(2).any(|pair| pair == [0xC3, 0xA8]));
    }
}
