use crate::models::{AnalysisRequest, PromptPayload};

const RESPONSE_FORMAT: &str = "Please respond in the following JSON format only, with no additional text:";

const NUTRITION_FIELDS: &str = r#"  "nutrition": {
    "calories": <number>,
    "protein": <number in grams>,
    "carbohydrates": <number in grams>,
    "fat": <number in grams>,
    "fiber": <number in grams>
  },
  "confidence": "high/medium/low"
}"#;

const NOT_FOOD_FALLBACK: &str = r#"If this is not food at all, respond with:
{
  "error": "Please upload an image of food"
}"#;

const NO_REGION: &str = "Important: In the description, only describe the dish and its ingredients. \
Do NOT mention or comment on what cuisine or region the dish is from.";

/// Renders the model prompt for a validated request.
///
/// User text goes into a natural-language instruction, not markup, so it is inserted as-is.
pub fn build_prompt(request: &AnalysisRequest) -> PromptPayload {
    match request {
        AnalysisRequest::Image { data, mime_type } => {
            PromptPayload::with_image(mime_type.clone(), data.clone(), image_instructions())
        }
        AnalysisRequest::Text { food_name, amount } => {
            PromptPayload::text_only(text_instructions(food_name, amount))
        }
    }
}

fn image_instructions() -> String {
    format!(
        "Analyze this image of food and provide nutrition information.\n\
         \n\
         {RESPONSE_FORMAT}\n\
         {{\n  \
         \"foodName\": \"Name of the dish\",\n  \
         \"description\": \"Brief description of the dish and its typical ingredients\",\n  \
         \"servingSize\": \"Estimated serving size shown\",\n\
         {NUTRITION_FIELDS}\n\
         \n\
         {NOT_FOOD_FALLBACK}\n\
         \n\
         {NO_REGION}\n\
         \n\
         Provide your best estimates for a typical serving of this dish."
    )
}

fn text_instructions(food_name: &str, amount: &str) -> String {
    format!(
        "Provide nutrition information for: \"{food_name}\" with quantity: \"{amount}\".\n\
         \n\
         {RESPONSE_FORMAT}\n\
         {{\n  \
         \"foodName\": \"{food_name}\",\n  \
         \"description\": \"Brief description of the dish and its typical ingredients\",\n  \
         \"servingSize\": \"{amount}\",\n\
         {NUTRITION_FIELDS}\n\
         \n\
         {NO_REGION}\n\
         \n\
         Make sure the nutrition values are scaled appropriately for the specified quantity."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentPart;

    fn text_of(payload: &PromptPayload) -> &str {
        match payload.parts().last() {
            Some(ContentPart::Text(text)) => text,
            other => panic!("expected trailing text part, got {:?}", other),
        }
    }

    #[test]
    fn test_image_prompt_layout() {
        let request = AnalysisRequest::Image {
            data: "aGVsbG8=".to_string(),
            mime_type: "image/webp".to_string(),
        };
        let payload = build_prompt(&request);

        assert_eq!(payload.parts().len(), 2);
        assert_eq!(
            payload.parts()[0],
            ContentPart::Image {
                media_type: "image/webp".to_string(),
                data: "aGVsbG8=".to_string(),
            }
        );

        let text = text_of(&payload);
        assert!(text.starts_with("Analyze this image of food"));
        assert!(text.contains("\"error\": \"Please upload an image of food\""));
        assert!(text.contains("Do NOT mention or comment on what cuisine or region"));
        for field in ["foodName", "description", "servingSize", "calories", "fiber", "confidence"] {
            assert!(text.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_text_prompt_interpolates_values() {
        let request = AnalysisRequest::text("Paneer Tikka", Some("200 g"));
        let payload = build_prompt(&request);

        assert_eq!(payload.parts().len(), 1);
        assert!(!payload.has_image());

        let text = text_of(&payload);
        assert!(text.starts_with(
            "Provide nutrition information for: \"Paneer Tikka\" with quantity: \"200 g\"."
        ));
        assert!(text.contains("\"foodName\": \"Paneer Tikka\""));
        assert!(text.contains("\"servingSize\": \"200 g\""));
        assert!(text.contains("scaled appropriately for the specified quantity"));
        assert!(text.contains("Do NOT mention or comment on what cuisine or region"));
        assert!(!text.contains("Please upload an image of food"));
    }

    #[test]
    fn test_text_prompt_uses_default_amount() {
        let payload = build_prompt(&AnalysisRequest::text("Idli", None));
        assert!(text_of(&payload).contains("with quantity: \"1 serving\""));
    }

    #[test]
    fn test_prompt_is_valid_json_skeleton() {
        let payload = build_prompt(&AnalysisRequest::text("Rice", None));
        let text = text_of(&payload);

        let start = text.find('{').unwrap();
        let end = text.rfind('}').unwrap();
        let skeleton = &text[start..=end];
        assert!(skeleton.contains("\"nutrition\": {"));
        assert_eq!(skeleton.matches('{').count(), skeleton.matches('}').count());
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let image = AnalysisRequest::Image {
            data: "iVBORw0KGgo=".to_string(),
            mime_type: "image/png".to_string(),
        };
        let text = AnalysisRequest::text("Masala Dosa", Some("1 plate"));

        assert_eq!(build_prompt(&image), build_prompt(&image));
        assert_eq!(build_prompt(&text), build_prompt(&text));
        assert_eq!(text_of(&build_prompt(&text)), text_of(&build_prompt(&text)));
    }
}
