//! FIM token formatting: one special-token table per supported base model,
//! per spec.md §6's bit-exact table.

use crate::error::LangError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseModel {
    Qwen25Coder,
    GraniteCode,
    CodeLlama,
    StarCoder,
}

impl BaseModel {
    pub fn parse(name: &str) -> Result<Self, LangError> {
        match name {
            "qwen2.5-coder" => Ok(Self::Qwen25Coder),
            "granite-code" => Ok(Self::GraniteCode),
            "codellama" => Ok(Self::CodeLlama),
            "starcoder" => Ok(Self::StarCoder),
            other => Err(LangError::UnknownBaseModel(other.to_string())),
        }
    }

    fn tokens(self) -> FimTokens {
        match self {
            Self::Qwen25Coder => FimTokens { prefix: "<|fim_prefix|>", suffix: "<|fim_suffix|>", middle: "<|fim_middle|>", eot: "<|endoftext|>" },
            Self::GraniteCode => FimTokens { prefix: "<fim_prefix>", suffix: "<fim_suffix>", middle: "<fim_middle>", eot: "<|endoftext|>" },
            Self::CodeLlama => FimTokens { prefix: "<PRE>", suffix: "<SUF>", middle: "<MID>", eot: "</s>" },
            Self::StarCoder => FimTokens { prefix: "<fim_prefix>", suffix: "<fim_suffix>", middle: "<fim_middle>", eot: "<|endoftext|>" },
        }
    }
}

struct FimTokens {
    prefix: &'static str,
    suffix: &'static str,
    middle: &'static str,
    eot: &'static str,
}

/// PSM ordering: `PREFIX_TOK · (cross_file_context+prefix) · SUFFIX_TOK ·
/// suffix · MIDDLE_TOK · middle · EOT_TOK`.
pub fn format_psm(model: BaseModel, cross_file_context: &str, prefix: &str, suffix: &str, middle: &str) -> String {
    let t = model.tokens();
    format!("{}{}{}{}{}{}{}{}", t.prefix, cross_file_context, prefix, t.suffix, suffix, t.middle, middle, t.eot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qwen_psm_matches_the_bit_exact_example() {
        let text = format_psm(BaseModel::Qwen25Coder, "", "P", "S", "M");
        assert_eq!(text, "<|fim_prefix|>P<|fim_suffix|>S<|fim_middle|>M<|endoftext|>");
    }

    #[test]
    fn codellama_uses_angle_bracket_tokens() {
        let text = format_psm(BaseModel::CodeLlama, "", "P", "S", "M");
        assert_eq!(text, "<PRE>P<SUF>S<MID>M</s>");
    }

    #[test]
    fn unknown_model_is_an_error() {
        assert!(BaseModel::parse("gpt-5").is_err());
    }
}
