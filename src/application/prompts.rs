use serde::Deserialize;

/// Prompt templates for the composer. `{query}`, `{candidates}` and
/// `{document}` are substituted per request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub recommendation: PromptTemplate,
    pub explanation: PromptTemplate,
    pub no_results_message: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            recommendation: PromptTemplate {
                system: "You recommend bakeries. Only recommend bakeries that appear in the \
                         candidate list you are given."
                    .to_string(),
                template: "User personality: {query}\n\n\
                           From the bakery candidates below, recommend three different bakeries \
                           that suit the user best. They must be different bakeries and must \
                           appear in the candidate list.\n\
                           {candidates}\n\n\
                           No explanation needed. For each bakery write its name on one line \
                           and its scores on the next line, in this form:\n\
                           <name>\n\
                           total: nn, taste: nn, price: nn, customer service: nn"
                    .to_string(),
            },
            explanation: PromptTemplate {
                system: String::new(),
                template: "In one line, explain how the recommended bakery relates to the \
                           personality the user described.\n\n\
                           User personality: {query}\n\n\
                           Recommended bakery: {document}"
                    .to_string(),
            },
            no_results_message: "No bakeries are indexed yet, so there is nothing to recommend."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    pub system: String,
    pub template: String,
}

impl PromptTemplate {
    /// Replaces `{name}` placeholders; unknown placeholders are left as they are.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        vars.iter().fold(self.template.clone(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let template = PromptTemplate {
            system: String::new(),
            template: "{query} / {candidates} / {other}".to_string(),
        };
        assert_eq!(
            template.render(&[("query", "calm"), ("candidates", "- A")]),
            "calm / - A / {other}"
        );
    }
}
