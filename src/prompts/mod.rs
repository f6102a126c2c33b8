//! Prompt builders for every completion call the pipeline issues.
//!
//! Each stage owns exactly one prompt shape: persona selection, sub-query
//! planning, per-chunk summarization, and the final report (one variant per
//! report type).

/// Persona used whenever automatic agent selection fails or is skipped.
pub const DEFAULT_AGENT: &str = "Default Agent";

/// Role prompt of the default persona.
pub const DEFAULT_AGENT_ROLE: &str = "You are an AI critical thinker research assistant. \
    Your sole purpose is to write well written, critically acclaimed, objective \
    and structured reports on given text.";

/// Instruction set for the persona-selection call. The model must answer
/// with a JSON object carrying `agent` and `agent_role_prompt`.
pub fn auto_agent_instructions() -> &'static str {
    r#"This task involves researching a given topic, regardless of its complexity or the availability of a definitive answer. The research is conducted by a specific server, defined by its type and role, where each server requires distinct instructions.

Examine the topic of the task and determine the single server category best suited to research it. Answer with a JSON object in the following format, and nothing else:

{"agent": "<emoji followed by the server name>", "agent_role_prompt": "<instructions describing the server's voice and duties>"}

Examples:
task: "should I invest in apple stocks?"
response: {"agent": "💰 Finance Agent", "agent_role_prompt": "You are a seasoned finance analyst AI assistant. Your primary goal is to compose comprehensive, astute, impartial, and methodically arranged financial reports based on provided data and trends."}
task: "could reselling sneakers become profitable?"
response: {"agent": "📈 Business Analyst Agent", "agent_role_prompt": "You are an experienced AI business analyst assistant. Your main objective is to produce comprehensive, insightful, impartial, and systematically structured business reports based on provided business data, market trends, and strategic analysis."}
task: "what are the most interesting sites in Tel Aviv?"
response: {"agent": "🌍 Travel Agent", "agent_role_prompt": "You are a world-travelled AI tour guide assistant. Your main purpose is to draft engaging, insightful, unbiased, and well-structured travel reports on given locations, including history, attractions, and cultural insights."}"#
}

/// Planner prompt asking for at most `max_iterations` search expansions of
/// the original query, as a bare JSON string array.
pub fn search_queries_prompt(query: &str, max_iterations: usize) -> String {
    format!(
        "Write {max_iterations} google search queries to search online that form an \
         objective opinion from the following task: \"{query}\"\n\
         You must respond with a JSON list of strings and nothing else, in the \
         following format: [\"query 1\", \"query 2\", \"query 3\"]"
    )
}

/// Per-chunk summarization prompt. The summary must stay factual and keep
/// any numbers or concrete data the chunk carries.
pub fn summary_prompt(query: &str, text: &str) -> String {
    format!(
        "{text}\n\nUsing the above text, summarize it based on the following task or \
         query: \"{query}\". If the query cannot be answered using the text, summarize \
         the text itself. Include all factual information such as numbers, statistics \
         and quotes if available."
    )
}

/// The report flavors the synthesizer knows how to prompt for. Unknown
/// wire values fall back to [`ReportType::Research`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Research,
    Resource,
    Outline,
}

impl ReportType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "resource_report" => ReportType::Resource,
            "outline_report" => ReportType::Outline,
            _ => ReportType::Research,
        }
    }

    /// Final synthesis prompt for this report type, fed with the aggregated
    /// research summaries as context.
    pub fn prompt(&self, query: &str, context: &str, report_format: &str, total_words: usize) -> String {
        match self {
            ReportType::Research => format!(
                "Information: \"\"\"{context}\"\"\"\n\n\
                 Using the above information, answer the following query or task: \
                 \"{query}\" in a detailed report. The report should focus on the \
                 answer to the query, be well structured, informative, in depth and \
                 comprehensive, with facts and numbers if available and a minimum of \
                 {total_words} words.\n\
                 Write all used source urls at the end of the report as references in \
                 {report_format} format. Use markdown syntax and an unbiased, \
                 journalistic tone."
            ),
            ReportType::Resource => format!(
                "Information: \"\"\"{context}\"\"\"\n\n\
                 Based on the above information, generate a bibliography \
                 recommendation report for the following query or task: \"{query}\". \
                 The report should provide a detailed analysis of each recommended \
                 resource, explaining how each source can contribute to finding answers \
                 to the research question. Include relevance, reliability and \
                 significance of each source. Structure the report with markdown \
                 syntax in {report_format} format, with a minimum of {total_words} \
                 words, and include all relevant source urls."
            ),
            ReportType::Outline => format!(
                "Information: \"\"\"{context}\"\"\"\n\n\
                 Using the above information, generate an outline in markdown syntax \
                 for a research report on the following query or task: \"{query}\". \
                 The outline should provide a well-structured framework of headers and \
                 subheaders, following {report_format} format, for a report of at \
                 least {total_words} words. Do not write the report itself, only its \
                 skeleton."
            ),
        }
    }
}
