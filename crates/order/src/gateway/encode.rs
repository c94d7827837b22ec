use std::collections::BTreeMap;
use url::form_urlencoded;

/// Percent-encodes one key or value. Spaces become `%20`, never `+`.
fn encode_component(raw: &str) -> String {
    // byte_serialize escapes a literal '+' as %2B, so every '+' left is a space
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Joins parameters as `k=v&k=v` in byte order of the keys.
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Keeps only `[0-9A-Za-z_]`.
pub fn sanitize_txn_ref(order_id: &str) -> String {
    order_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

const FOLDS: &[(&str, char)] = &[
    ("àáạảãâầấậẩẫăằắặẳẵäåā", 'a'),
    ("ÀÁẠẢÃÂẦẤẬẨẪĂẰẮẶẲẴÄÅĀ", 'A'),
    ("èéẹẻẽêềếệểễëē", 'e'),
    ("ÈÉẸẺẼÊỀẾỆỂỄËĒ", 'E'),
    ("ìíịỉĩïī", 'i'),
    ("ÌÍỊỈĨÏĪ", 'I'),
    ("òóọỏõôồốộổỗơờớợởỡöøō", 'o'),
    ("ÒÓỌỎÕÔỒỐỘỔỖƠỜỚỢỞỠÖØŌ", 'O'),
    ("ùúụủũưừứựửữüū", 'u'),
    ("ÙÚỤỦŨƯỪỨỰỬỮÜŪ", 'U'),
    ("ỳýỵỷỹÿ", 'y'),
    ("ỲÝỴỶỸŸ", 'Y'),
    ("đ", 'd'),
    ("Đ", 'D'),
    ("çč", 'c'),
    ("ÇČ", 'C'),
    ("ñ", 'n'),
    ("Ñ", 'N'),
    ("šś", 's'),
    ("ŠŚ", 'S'),
    ("žź", 'z'),
    ("ŽŹ", 'Z'),
];

fn fold_char(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    FOLDS
        .iter()
        .find(|(accented, _)| accented.contains(c))
        .map(|(_, plain)| *plain)
}

/// Transliterates accented Latin letters to ASCII and drops anything else
/// outside printable ASCII. Combining marks (decomposed input) fall away.
pub fn to_ascii(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter_map(fold_char)
        .map(|c| if c.is_ascii_whitespace() { ' ' } else { c })
        .filter(|c| !c.is_ascii_control())
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vietnamese_description_is_transliterated() {
        assert_eq!(to_ascii("Thanh toán đơn hàng"), "Thanh toan don hang");
        assert_eq!(to_ascii("ĐẶT MUA Phần mềm"), "DAT MUA Phan mem");
    }

    #[test]
    fn decomposed_marks_and_symbols_are_dropped() {
        // "e" followed by a combining acute accent
        assert_eq!(to_ascii("Cafe\u{301} ☕  ok"), "Cafe ok");
    }

    #[test]
    fn txn_ref_keeps_word_characters_only() {
        assert_eq!(sanitize_txn_ref("ORD-1/2 x_y"), "ORD12x_y");
        assert_eq!(sanitize_txn_ref("--"), "");
    }

    #[test]
    fn canonical_query_is_sorted_and_percent_encoded() {
        let params = BTreeMap::from([
            ("vnp_OrderInfo".to_string(), "Thanh toan don hang ORD1".to_string()),
            ("vnp_Amount".to_string(), "5000000".to_string()),
            (
                "vnp_ReturnUrl".to_string(),
                "https://shop.example/api/payment/callback?a=1+2".to_string(),
            ),
        ]);

        assert_eq!(
            canonical_query(&params),
            "vnp_Amount=5000000\
             &vnp_OrderInfo=Thanh%20toan%20don%20hang%20ORD1\
             &vnp_ReturnUrl=https%3A%2F%2Fshop.example%2Fapi%2Fpayment%2Fcallback%3Fa%3D1%2B2"
        );
    }
}
