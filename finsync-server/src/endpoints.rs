//! The API endpoint URIs.

/// Replace all public tokens with fresh sandbox tokens.
pub const CREATE_PUBLIC_TOKENS: &str = "/createPublicTokens";
/// Exchange the stored public tokens for access tokens.
pub const EXCHANGE_PUBLIC_TOKENS: &str = "/exchangePublicTokensAndStore";
/// Fetch and store transactions for every access token.
pub const GET_TRANSACTIONS: &str = "/getTransactions";
/// Mean transaction amount per category.
pub const CALCULATE_MONTHLY_BUDGET: &str = "/calculateMonthlyBudget";
/// Liveness probe.
pub const HEALTH: &str = "/health";
