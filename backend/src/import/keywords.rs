//! Keyword rules used to guess the canonical field of a column header.
//!
//! Rules are checked top to bottom and the first keyword contained in the
//! lowercased header wins, so more specific rules come first: `barcode`
//! before `code`, `cost` before `price`, `company` before `name`, and so on.
//! Keywords cover the Portuguese and English headers found in spreadsheet
//! exports, with and without accents.

use common::model::record::{RecordKind, TargetField};

pub struct KeywordRule {
    pub field: TargetField,
    pub keywords: &'static [&'static str],
}

const fn rule(field: TargetField, keywords: &'static [&'static str]) -> KeywordRule {
    KeywordRule { field, keywords }
}

const CLIENT_RULES: &[KeywordRule] = &[
    rule(TargetField::Email, &["e-mail", "email", "correio eletr"]),
    rule(
        TargetField::Phone,
        &["telefone", "phone", "celular", "whatsapp", "fone", "mobile", "tel."],
    ),
    rule(
        TargetField::Identifier,
        &["cpf", "cnpj", "documento", "document", "tax id", "vat"],
    ),
    rule(TargetField::PostalCode, &["cep", "zip", "postal"]),
    rule(
        TargetField::Address,
        &["endereço", "endereco", "address", "logradouro", "rua", "street"],
    ),
    rule(TargetField::City, &["cidade", "city", "município", "municipio"]),
    rule(
        TargetField::State,
        &["estado", "state", "uf", "região", "regiao", "region", "province"],
    ),
    rule(
        TargetField::Company,
        &["empresa", "company", "razão social", "razao social", "organização", "organization"],
    ),
    rule(
        TargetField::Name,
        &["nome", "name", "cliente", "client", "contato", "contact"],
    ),
    rule(
        TargetField::Notes,
        &["observa", "obs", "notes", "nota", "comment", "coment"],
    ),
];

const PRODUCT_RULES: &[KeywordRule] = &[
    rule(
        TargetField::Barcode,
        &["barcode", "código de barras", "codigo de barras", "ean", "gtin"],
    ),
    rule(
        TargetField::Code,
        &["código", "codigo", "code", "sku", "referência", "referencia", "ref"],
    ),
    rule(TargetField::Cost, &["custo", "cost"]),
    rule(TargetField::Price, &["preço", "preco", "price", "valor", "value"]),
    rule(
        TargetField::Stock,
        &["estoque", "stock", "quantidade", "qtd", "qty", "inventory"],
    ),
    rule(TargetField::Weight, &["peso", "weight"]),
    rule(
        TargetField::Dimensions,
        &["dimens", "tamanho", "size", "medidas"],
    ),
    rule(TargetField::Unit, &["unidade", "unit", "un."]),
    rule(TargetField::Category, &["categoria", "category", "grupo", "group"]),
    rule(TargetField::Brand, &["marca", "brand", "fabricante", "manufacturer"]),
    rule(TargetField::Supplier, &["fornecedor", "supplier", "vendor"]),
    rule(
        TargetField::Description,
        &["descrição", "descricao", "description", "detalhe", "details"],
    ),
    rule(TargetField::Status, &["status", "situação", "situacao", "ativo", "active"]),
    rule(
        TargetField::Name,
        &["nome", "name", "produto", "product", "serviço", "servico", "service", "item", "título", "titulo", "title"],
    ),
];

/// Rule table for a record kind, in priority order.
pub fn rules_for(kind: RecordKind) -> &'static [KeywordRule] {
    match kind {
        RecordKind::Client => CLIENT_RULES,
        RecordKind::Product => PRODUCT_RULES,
    }
}

/// Keywords this short only match a whole word of the header: `ean` must not
/// claim "Jeans", nor `ref` "Refrigerado".
const WHOLE_WORD_MAX: usize = 3;

/// First canonical field whose keyword appears in `header`.
pub fn classify(kind: RecordKind, header: &str) -> Option<TargetField> {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return None;
    }
    let words: Vec<&str> = header
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    rules_for(kind)
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| keyword_matches(&header, &words, k)))
        .map(|rule| rule.field)
}

fn keyword_matches(header: &str, words: &[&str], keyword: &str) -> bool {
    let bare = keyword.trim_matches(|c: char| !c.is_alphanumeric());
    if bare.chars().count() <= WHOLE_WORD_MAX {
        words.contains(&bare)
    } else {
        header.contains(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_fields_belong_to_their_kind() {
        for kind in [RecordKind::Client, RecordKind::Product] {
            for rule in rules_for(kind) {
                assert!(rule.field.belongs_to(kind), "{} on {}", rule.field, kind);
            }
        }
    }

    #[test]
    fn client_headers() {
        let k = RecordKind::Client;
        assert_eq!(classify(k, "Nome Completo"), Some(TargetField::Name));
        assert_eq!(classify(k, "E-mail"), Some(TargetField::Email));
        assert_eq!(classify(k, "Celular"), Some(TargetField::Phone));
        assert_eq!(classify(k, "CPF"), Some(TargetField::Identifier));
        assert_eq!(classify(k, "Endereço de e-mail"), Some(TargetField::Email));
        assert_eq!(classify(k, "CEP"), Some(TargetField::PostalCode));
        assert_eq!(classify(k, "Nome da Empresa"), Some(TargetField::Company));
        assert_eq!(classify(k, "Aniversário"), None);
    }

    #[test]
    fn product_headers_prefer_specific_rules() {
        let k = RecordKind::Product;
        assert_eq!(classify(k, "Código de barras"), Some(TargetField::Barcode));
        assert_eq!(classify(k, "SKU"), Some(TargetField::Code));
        assert_eq!(classify(k, "Preço de custo"), Some(TargetField::Cost));
        assert_eq!(classify(k, "Preço de venda"), Some(TargetField::Price));
        assert_eq!(classify(k, "Unit price"), Some(TargetField::Price));
        assert_eq!(classify(k, "Supplier name"), Some(TargetField::Supplier));
        assert_eq!(classify(k, "Nome do produto"), Some(TargetField::Name));
        assert_eq!(classify(k, "Cor"), None);
    }

    #[test]
    fn short_keywords_match_whole_words_only() {
        let p = RecordKind::Product;
        assert_eq!(classify(p, "Jeans"), None);
        assert_eq!(classify(p, "Refrigerado"), None);
        assert_eq!(classify(p, "EAN"), Some(TargetField::Barcode));
        assert_eq!(classify(p, "Ref."), Some(TargetField::Code));
        assert_eq!(classify(p, "Qtd (un)"), Some(TargetField::Stock));

        let c = RecordKind::Client;
        assert_eq!(classify(c, "Bufê"), None);
        assert_eq!(classify(c, "UF"), Some(TargetField::State));
        assert_eq!(classify(c, "Tel"), Some(TargetField::Phone));
        assert_eq!(classify(c, "Obs."), Some(TargetField::Notes));
    }
}
