//! SQL statements used by the game store.
//!
//! Table definitions live in `migrations/` at the workspace root.

// --- catalog reads ---

pub const SELECT_LEVEL: &str = "SELECT id, level_number, title FROM levels WHERE id = $1";

pub const SELECT_LEVELS: &str = "SELECT id, level_number, title FROM levels ORDER BY level_number";

pub const SELECT_LEVEL_SCENARIOS: &str = r"
SELECT id, level_id, ordinal_position, prompt_text
FROM scenarios
WHERE level_id = $1
ORDER BY ordinal_position
";

pub const SELECT_SCENARIO: &str =
    "SELECT id, level_id, ordinal_position, prompt_text FROM scenarios WHERE id = $1";

/// Choices are listed by id; imported ids are time-ordered, so this is
/// authoring order.
pub const SELECT_SCENARIO_CHOICES: &str = r"
SELECT id, scenario_id, option_text, outcome_text, correctness
FROM choices
WHERE scenario_id = $1
ORDER BY id
";

pub const SELECT_CHOICE: &str =
    "SELECT id, scenario_id, option_text, outcome_text, correctness FROM choices WHERE id = $1";

pub const SELECT_ATTRIBUTE: &str = "SELECT id, name, description FROM attributes WHERE id = $1";

pub const SELECT_ATTRIBUTES: &str = "SELECT id, name, description FROM attributes ORDER BY name";

// --- catalog writes ---

pub const INSERT_LEVEL: &str =
    "INSERT INTO levels (id, level_number, title) VALUES ($1, $2, $3)";

pub const INSERT_SCENARIO: &str = r"
INSERT INTO scenarios (id, level_id, ordinal_position, prompt_text)
VALUES ($1, $2, $3, $4)
";

pub const INSERT_CHOICE: &str = r"
INSERT INTO choices (id, scenario_id, option_text, outcome_text, correctness)
VALUES ($1, $2, $3, $4, $5)
";

pub const INSERT_ATTRIBUTE: &str =
    "INSERT INTO attributes (id, name, description) VALUES ($1, $2, $3)";

/// Inserts an effect edge or overwrites the delta of an existing one.
pub const UPSERT_CHOICE_EFFECT: &str = r"
INSERT INTO choice_attribute_effects (choice_id, attribute_id, delta)
VALUES ($1, $2, $3)
ON CONFLICT (choice_id, attribute_id) DO UPDATE SET delta = EXCLUDED.delta
";

pub const SELECT_CHOICE_EFFECTS: &str = r"
SELECT attribute_id, delta
FROM choice_attribute_effects
WHERE choice_id = $1
ORDER BY attribute_id
";

// --- players ---

pub const INSERT_PLAYER: &str = r"
INSERT INTO players (user_id, firstname, lastname, age, crisis_ready, created_at)
VALUES ($1, $2, $3, $4, $5, $6)
";

pub const SELECT_PLAYER: &str = r"
SELECT user_id, firstname, lastname, age, crisis_ready, created_at
FROM players
WHERE user_id = $1
";

// --- scoring ---

pub const SELECT_PLAYER_SCORES: &str = r"
SELECT user_id, attribute_id, score
FROM player_attribute_scores
WHERE user_id = $1
";

/// Single-statement increment; concurrent callers serialize on the row lock.
pub const INCREMENT_SCORE: &str = r"
INSERT INTO player_attribute_scores (user_id, attribute_id, score)
VALUES ($1, $2, $3)
ON CONFLICT (user_id, attribute_id)
DO UPDATE SET score = player_attribute_scores.score + EXCLUDED.score
RETURNING score
";

pub const INSERT_CHOICE_RECORD: &str = r"
INSERT INTO player_choice_records (id, user_id, level_id, scenario_id, choice_id, chosen_at)
VALUES ($1, $2, $3, $4, $5, $6)
";

// --- statistics ---

pub const SELECT_CHOICE_OVERVIEW: &str = r"
SELECT r.scenario_id,
       COUNT(*) FILTER (WHERE c.correctness = 'good')    AS good,
       COUNT(*) FILTER (WHERE c.correctness = 'bad')     AS bad,
       COUNT(*) FILTER (WHERE c.correctness = 'neutral') AS neutral
FROM player_choice_records r
JOIN choices c ON c.id = r.choice_id
GROUP BY r.scenario_id
ORDER BY r.scenario_id
";

pub const SELECT_AGE_BEHAVIOR: &str = r"
SELECT (p.age / 10) * 10 AS age_band, c.correctness, COUNT(*) AS count
FROM player_choice_records r
JOIN players p ON p.user_id = r.user_id
JOIN choices c ON c.id = r.choice_id
GROUP BY age_band, c.correctness
ORDER BY age_band, c.correctness
";

pub const SELECT_ATTRIBUTE_IMPACTS: &str = r"
SELECT a.id, a.name, SUM(s.score)::BIGINT AS total
FROM player_attribute_scores s
JOIN attributes a ON a.id = s.attribute_id
GROUP BY a.id, a.name
ORDER BY total DESC, a.name
";
