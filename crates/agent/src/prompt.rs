//! Prompt construction for the sales-agent persona.

use storebot_core::ProductRecord;

use crate::llm::InferenceRequest;

/// Reply-script register derived from one coarse heuristic: any character in
/// the Arabic Unicode block means the query is written in the target script.
/// This is a script check, not a linguistic guarantee; Romanized regional
/// queries fall through to the Latin branch and get a Latin-script reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyRegister {
    Latin,
    ArabicScript,
}

pub fn detect_register(query: &str) -> ReplyRegister {
    if query.chars().any(|ch| ('\u{0600}'..='\u{06FF}').contains(&ch)) {
        ReplyRegister::ArabicScript
    } else {
        ReplyRegister::Latin
    }
}

pub struct PromptBuilder<'a> {
    store_name: &'a str,
    currency_prefix: &'a str,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(store_name: &'a str, currency_prefix: &'a str) -> Self {
        Self { store_name, currency_prefix }
    }

    pub fn build(&self, request: &InferenceRequest) -> String {
        let script_rule = match detect_register(&request.query) {
            ReplyRegister::Latin => {
                "Reply in the user's own language, written in Latin script \
                 (Romanized transliteration, English alphabets only)."
            }
            ReplyRegister::ArabicScript => {
                "Reply in the user's own language, written in its native script."
            }
        };
        let brand_list = request.brands.join(", ");
        let product_block = format_product_lines(&request.products, self.currency_prefix);

        format!(
            "You are a friendly sales agent for {store_name}.\n\
             \n\
             Rules:\n\
             - Always reply in the same language as the user query.\n\
             - {script_rule}\n\
             - Keep replies short (3-6 lines), friendly and casual like a chat message.\n\
             - If the user asks for products, show at most 2-3 best suggestions.\n\
             - If a price range is given, suggest only products from that range.\n\
             - End with a small follow-up question or call-to-action.\n\
             \n\
             Website content:\n{site_excerpt}\n\
             \n\
             Available brands:\n{brand_list}\n\
             \n\
             Sample products:\n{product_block}\n\
             \n\
             User asked: {query}\n",
            store_name = self.store_name,
            site_excerpt = request.site_excerpt,
            query = request.query,
        )
    }
}

/// One line per product: `<title> - <currency-prefix> <price-or-'N/A'>`.
pub fn format_product_lines(products: &[ProductRecord], currency_prefix: &str) -> String {
    products
        .iter()
        .map(|product| {
            let price = if product.price.trim().is_empty() { "N/A" } else { product.price.trim() };
            format!("{} - {} {}", product.title, currency_prefix, price)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inverse of [`format_product_lines`]: recover the titles, in order. Splits
/// on the last ` - <prefix> ` so titles containing ` - ` survive.
pub fn parse_product_lines(block: &str, currency_prefix: &str) -> Vec<String> {
    let separator = format!(" - {currency_prefix} ");
    block
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.rsplit_once(&separator).map(|(title, _)| title.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use storebot_core::ProductRecord;

    use crate::llm::InferenceRequest;

    use super::{
        detect_register, format_product_lines, parse_product_lines, PromptBuilder, ReplyRegister,
    };

    fn record(title: &str, price: &str) -> ProductRecord {
        ProductRecord {
            title: title.to_string(),
            price: price.to_string(),
            image_url: None,
            product_link: String::new(),
        }
    }

    #[test]
    fn latin_queries_get_the_latin_register() {
        assert_eq!(detect_register("mujhe running shoes dikhao"), ReplyRegister::Latin);
        assert_eq!(detect_register("show me running shoes"), ReplyRegister::Latin);
    }

    #[test]
    fn arabic_block_characters_switch_the_register() {
        assert_eq!(detect_register("مجھے جوتے دکھاؤ"), ReplyRegister::ArabicScript);
        // one character is enough, the heuristic is all-or-nothing
        assert_eq!(detect_register("shoes ك please"), ReplyRegister::ArabicScript);
    }

    #[test]
    fn product_lines_round_trip_titles_in_order() {
        let products = vec![
            record("Air Max 90 Black Red", "2500"),
            record("Slide Box - Beige Black", "9000"),
            record("Retropy E5 Camel", ""),
        ];
        let block = format_product_lines(&products, "Rs.");
        let titles = parse_product_lines(&block, "Rs.");

        assert_eq!(
            titles,
            vec!["Air Max 90 Black Red", "Slide Box - Beige Black", "Retropy E5 Camel"]
        );
    }

    #[test]
    fn empty_price_renders_as_not_available() {
        let block = format_product_lines(&[record("Retropy E5 Camel", "  ")], "Rs.");
        assert_eq!(block, "Retropy E5 Camel - Rs. N/A");
    }

    #[test]
    fn prompt_embeds_query_content_brands_and_products() {
        let prompt = PromptBuilder::new("Trend Street", "Rs.").build(&InferenceRequest {
            query: "comfortable shoes for foot pain".to_string(),
            site_excerpt: "We ship nationwide.".to_string(),
            brands: vec!["Nike".to_string(), "Adidas".to_string()],
            products: vec![record("Air Max 90", "2500")],
        });

        assert!(prompt.contains("sales agent for Trend Street"));
        assert!(prompt.contains("We ship nationwide."));
        assert!(prompt.contains("Nike, Adidas"));
        assert!(prompt.contains("Air Max 90 - Rs. 2500"));
        assert!(prompt.contains("User asked: comfortable shoes for foot pain"));
        assert!(prompt.contains("Latin script"));
    }
}
