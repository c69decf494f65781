//! Prompt templates for the two assistant modes.

/// Cataloging prompt for translator mode.
pub fn cataloging_prompt(has_image: bool) -> String {
    let source = if has_image { "image" } else { "text" };
    format!(
        "Cataloging Foreign Language Resource\n\
         Instruction\n\
         As a helpful professional Catalog Librarian, analyze the provided {source} of a \
         foreign language resource and provide a structured response with the following \
         cataloging information: title and statement of responsibility as transcribed, \
         romanization, language of the resource, an English translation of the title, \
         publication details, and suggested subject headings."
    )
}

/// pymarc scripting prompt for coder mode.
pub fn pymarc_prompt(request: &str) -> String {
    format!(
        "You are an expert Python programmer specializing in library catalog systems and \
         MARC record manipulation using pymarc. Your task is to create Python scripts that \
         help catalog librarians manage MARC data efficiently.\n\n\
         Key requirements:\n\
         1. Use modern pymarc syntax for field creation and manipulation\n\
         2. Always use add_ordered_field() instead of add_field()\n\
         3. Use pymarc.Field and pymarc.Subfield for field and subfield creation; never \
         manipulate subfield text directly in add_field\n\n\
         Based on the following request, provide a complete, working Python script using \
         pymarc:\n\n{request}\n\n\
         Your response should include all necessary imports, clear comments, error \
         handling for file operations, proper pymarc field creation syntax, use of \
         add_ordered_field(), and a sample usage example. Provide the complete script \
         with no truncation."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cataloging_prompt_names_the_source() {
        assert!(cataloging_prompt(true).contains("provided image"));
        assert!(cataloging_prompt(false).contains("provided text"));
    }

    #[test]
    fn pymarc_prompt_embeds_the_request() {
        let prompt = pymarc_prompt("dedupe 650 fields");
        assert!(prompt.contains("dedupe 650 fields"));
        assert!(prompt.contains("add_ordered_field()"));
    }
}
