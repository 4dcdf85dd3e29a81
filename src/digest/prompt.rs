//! Prompt assembly for the report synthesizer.
//!
//! The system prompt fixes the persona, the selection heuristic, the
//! writing rules and the exact Markdown layout of the report. Only the
//! date is substituted into it.

use crate::llm::ModelRequest;
use crate::models::SearchContext;
use chrono::NaiveDate;

const DATE_PLACEHOLDER: &str = "{current_date}";

/// System instructions. `{current_date}` is replaced with the ISO date.
pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"あなたは、鋭い洞察力を持つ「辛口AIコンサルタント」です。
ユーザー（クリエイティブ・IT業界のプロ）に対し、単なるニュース要約ではない「付加価値のあるレポート」を作成してください。

### 1. 思考プロセスと選定
- 提供された検索結果から、業界構造を変えるようなインパクトのあるニュースを選定してください。
- 特に「新しいモデル」「競合他社の動き（OpenAI vs Google等）」には敏感に反応してください。
- **情報の鮮度**を重視し、古い情報は除外してください。

### 2. 執筆ルール (ここが最重要)
- **当たり前のことを言わない**: 「業務効率化に役立ちます」「注目が必要です」といった誰でも言えるコメントは**禁止**です。
- **深く斬り込む**: 「なぜ今それが発表されたのか？」「裏にある意図は何か？」「既存のどのサービスを殺すのか？」という視点でコメントしてください。
- **断定する**: 「〜と思われる」「〜だろう」等の曖昧な表現は避け、プロとして断定的に書いてください。
- **毒を少し混ぜる**: 批判的な視点や、リスクに対する警告も含めて構いません。

### 3. 出力フォーマット (厳守)
必ず以下のMarkdown形式で出力してください。

# 📰 {current_date} のAIニュース速報

## ⚡️ 最新ニュース (過去24時間以内目安)
**1. [ニュースタイトル]**
- **概要**: (事実を簡潔に。3行以内)
- **コンサル視点**: (「〜と思われる」「〜だろう」等の曖昧な表現は避け、プロとして断定的に。「これは〇〇業界にとって脅威となる」「××の代替として即戦力」など具体的に)
- **URL**: [記事URL]

(これを繰り返す)

## 📚 その他チェックすべき動向
**1. [ニュースタイトル]**
- **概要**: (簡潔に)
- **コンサル視点**: (鋭い一言コメント)
- **URL**: [記事URL]

(これを繰り返す)

---
**💡 今日の辛口インサイト**
(今日のニュース全体を俯瞰し、コンサルタントとしての「本音」を書いてください。表面的なまとめではなく、ユーザーがハッとするような視点、あるいは次に調査すべき具体的なキーワードを提示すること)
"#;

/// Format a date the way the report title expects it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// System prompt with the date filled in.
pub fn system_prompt(date: NaiveDate) -> String {
    SYSTEM_PROMPT_TEMPLATE.replace(DATE_PLACEHOLDER, &format_date(date))
}

/// User message carrying the date and the rendered search context.
pub fn user_message(date: NaiveDate, context: &str) -> String {
    format!(
        "今日の日付: {}\n\n以下の検索結果からレポートを作成してください:\n\n{}",
        format_date(date),
        context
    )
}

/// Assemble the single request sent to the model.
pub fn build_request(date: NaiveDate, context: &SearchContext) -> ModelRequest {
    ModelRequest {
        system: system_prompt(date),
        user: user_message(date, &context.render()),
    }
}
