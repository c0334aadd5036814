const JOB_PROMPT_TEMPLATE: &str = r#"
You are an expert technical recruiter. Based on the following user input, generate a detailed, professional job description for a tech role.

User Input: {user_input}

Format the job description as follows:
- Job Title
- Location
- Type (e.g., Full-Time, Part-Time, Contract)
- Experience Level (e.g., Mid-level, Senior, etc.)
- About Us: A brief company description (invent if not provided).
- A short summary inviting candidates to apply.
- What You'll Do: A bulleted list of 4-6 key responsibilities.
- (Optional) Qualifications or skills if mentioned by user.

Then, output a JSON object with the following fields:
{
  "job_description": "...full job description as plain text...",
  "filters": {
    "job_role": "...",
    "positions": "...",
    "years_of_experience": "...",
    "work_type": "...",
    "annual_salary_range": "...",
    "max_notice_period": "...",
    "job_location": "...",
    "closing_date": "...",
    "skills_tags": ["...", "..."],
    "search_tags": ["...", "..."]
  }
}
Return only the JSON object, no extra text.
"#;

/// Fills the recruiter template. A non-blank edit instruction is appended to
/// the stored prompt on its own line.
pub fn build_job_prompt(user_prompt: &str, edit_instruction: Option<&str>) -> String {
    let user_input = match edit_instruction.map(str::trim).filter(|edit| !edit.is_empty()) {
        Some(edit) => format!("{}\n{}", user_prompt.trim(), edit),
        None => user_prompt.trim().to_string(),
    };
    JOB_PROMPT_TEMPLATE.replace("{user_input}", &user_input)
}

#[cfg(test)]
mod tests {
    use super::build_job_prompt;

    #[test]
    fn prompt_embeds_user_input() {
        let prompt = build_job_prompt("  Rust engineer, Berlin ", None);
        assert!(prompt.contains("User Input: Rust engineer, Berlin\n"));
        assert!(prompt.contains("\"job_description\""));
        assert!(prompt.contains("Return only the JSON object"));
        assert!(!prompt.contains("{user_input}"));
    }

    #[test]
    fn prompt_appends_edit_instruction_only_when_given() {
        let edited = build_job_prompt("Rust engineer", Some("make it remote"));
        assert!(edited.contains("User Input: Rust engineer\nmake it remote\n"));

        let blank = build_job_prompt("Rust engineer", Some("   "));
        assert_eq!(blank, build_job_prompt("Rust engineer", None));
    }
}
