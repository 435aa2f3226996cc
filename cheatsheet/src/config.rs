use anyhow::Context;
use learn_frontend_rs::SupabaseConfig;
use learn_frontend_rs::supabase::DEFAULT_TABLE;

/// Reads `SUPABASE_URL`, `SUPABASE_KEY` and optionally `SUPABASE_TABLE`.
pub fn supabase_config(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<SupabaseConfig> {
    let supabase_url = lookup("SUPABASE_URL").context("SUPABASE_URL not set")?;
    let supabase_anon_key = lookup("SUPABASE_KEY").context("SUPABASE_KEY not set")?;
    let table = lookup("SUPABASE_TABLE")
        .filter(|table| !table.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TABLE.to_string());
    Ok(SupabaseConfig {
        supabase_url,
        supabase_anon_key,
        table,
    })
}

pub fn supabase_config_from_env() -> anyhow::Result<SupabaseConfig> {
    supabase_config(|name| std::env::var(name).ok())
}
