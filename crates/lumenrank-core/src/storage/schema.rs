pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS flashlights (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL,
  is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS flashlight_specs (
  flashlight_id INTEGER PRIMARY KEY REFERENCES flashlights(id),
  max_lumens REAL,
  max_candela REAL,
  beam_distance_m REAL,
  runtime_medium_min REAL,
  runtime_high_min REAL,
  waterproof_rating TEXT,
  impact_resistance_m REAL
);

CREATE TABLE IF NOT EXISTS flashlight_price_snapshots (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  flashlight_id INTEGER NOT NULL REFERENCES flashlights(id),
  price REAL NOT NULL,
  currency_code TEXT NOT NULL DEFAULT 'USD',
  captured_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scoring_runs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  run_label TEXT NOT NULL,
  formula_version TEXT NOT NULL,
  status TEXT NOT NULL CHECK (status IN ('running', 'completed', 'failed')),
  initiated_by TEXT NOT NULL,
  started_at TEXT NOT NULL,
  completed_at TEXT,
  notes TEXT
);

CREATE TABLE IF NOT EXISTS scoring_profiles (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  slug TEXT NOT NULL UNIQUE,
  display_name TEXT NOT NULL,
  description TEXT NOT NULL,
  version INTEGER NOT NULL DEFAULT 1,
  is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS flashlight_scores (
  run_id INTEGER NOT NULL REFERENCES scoring_runs(id),
  flashlight_id INTEGER NOT NULL REFERENCES flashlights(id),
  profile_id INTEGER NOT NULL REFERENCES scoring_profiles(id),
  score REAL NOT NULL CHECK (score >= 0 AND score <= 100),
  rank_position INTEGER,
  metric_breakdown TEXT NOT NULL,
  generated_at TEXT NOT NULL,
  PRIMARY KEY (run_id, flashlight_id, profile_id)
);

CREATE INDEX IF NOT EXISTS idx_price_snapshots_latest
  ON flashlight_price_snapshots(flashlight_id, currency_code, captured_at);
CREATE INDEX IF NOT EXISTS idx_scores_run_profile
  ON flashlight_scores(run_id, profile_id, score);
CREATE INDEX IF NOT EXISTS idx_runs_status_completed
  ON scoring_runs(status, completed_at);
"#;
