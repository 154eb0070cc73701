//! 入力可能な文字の分類

/// 受け付ける文字の種類
#[derive(Debug, Clone, Copy, Default)]
pub enum CharClass {
    /// `'0'..='9'` のみ
    Digits,
    /// 数字、空白、英字、Latin-1拡張文字、記号
    #[default]
    General,
    /// 呼び出し側が判定する
    Custom(fn(char) -> bool),
}

impl CharClass {
    /// 文字を受け付けるかどうか
    pub fn accepts(&self, ch: char) -> bool {
        match self {
            CharClass::Digits => ch.is_ascii_digit(),
            CharClass::General => is_general(ch),
            CharClass::Custom(predicate) => predicate(ch),
        }
    }
}

fn is_general(ch: char) -> bool {
    matches!(
        u32::from(ch),
        32              // space
        | 33..=47       // ! " # $ % & ' ( ) * + , - . /
        | 48..=57       // 0-9
        | 58..=64       // : ; < = > ? @
        | 65..=90       // A-Z
        | 91..=96       // [ \ ] ^ _ `
        | 97..=122      // a-z
        | 123..=126     // { | } ~
        | 192..=254     // À-þ
    )
}
