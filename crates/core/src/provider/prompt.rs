//! Prompt construction for LLM move providers.

use super::ProposalRequest;

/// Rules and the JSON contract, specialised for the active variant.
pub fn system_prompt(request: &ProposalRequest) -> String {
    let language = &request.language;
    let mut prompt = format!(
        "You are an expert player of a crossword tile game in the {language} language variant. \
Play to win and obey the standard rules for that language.\n\
\n\
Rules:\n\
- Place tiles only on empty cells; never overwrite a letter on the board.\n\
- All placements must lie in one row or one column with no empty gap between them.\n\
- After the first move, at least one placement must touch an existing letter.\n\
- On an empty board the first move must cover the center cell (row 7, col 7).\n\
- Every word formed, including perpendicular words, must be a valid {language} word. \
Do not extend an existing word into a non-word.\n\
- Use only tiles from the rack. A '?' tile is a wildcard worth 0 points; \
give the letter it stands for in `blanks`.\n\
\n\
Tile distribution (letter:count(points)): {tiles}\n",
        language = language,
        tiles = request.tile_summary,
    );

    if !request.premium_summary.is_empty() {
        prompt.push_str(
            "\nPremium cells (0-based row,col). Premiums under existing letters are already used:\n",
        );
        prompt.push_str(&request.premium_summary);
        prompt.push('\n');
    }

    prompt.push_str(
        r#"
Respond with a single JSON object and nothing else:
{"placements": [{"row": 7, "col": 7, "letter": "C"}], "blanks": {"7,8": "A"}, "word": "CAT"}

- Coordinates are 0-based.
- `blanks` maps "row,col" of every '?' placement to its letter; omit it if you use no wildcard.
- `word` is the main word formed along your line, including board letters.
- To pass, respond {"pass": true}. To swap tiles, respond {"exchange": ["A", "B"]}.
"#,
    );
    prompt
}

/// Current game state for the user message.
pub fn user_prompt(request: &ProposalRequest) -> String {
    format!(
        "Board ('.' is empty):\n{}\nPropose your best move.",
        request.snapshot.compact_text()
    )
}
