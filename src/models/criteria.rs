use serde::{Deserialize, Serialize};

use super::record::PackingRecord;

/// 文本筛选作用的字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    #[default]
    SeasoningType,
    ManufactureProduct,
    FishType,
    Origin,
}

impl TextField {
    pub fn value<'a>(&self, record: &'a PackingRecord) -> &'a str {
        match self {
            TextField::SeasoningType => &record.seasoning_type,
            TextField::ManufactureProduct => &record.manufacture_product,
            TextField::FishType => &record.fish_type,
            TextField::Origin => &record.origin,
        }
    }
}

/// 检索条件
///
/// 每个条件都可以省略；空字符串与缺省等价。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// 制造日（按日历日精确匹配）
    pub date: Option<String>,
    /// 文本（忽略大小写的包含匹配）
    #[serde(alias = "product")]
    pub text: Option<String>,
    /// 状态（完了 / 未処理）
    pub status: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_number")]
    pub quantity_min: Option<u64>,
    #[serde(deserialize_with = "deserialize_optional_number")]
    pub quantity_max: Option<u64>,
    #[serde(deserialize_with = "deserialize_optional_number")]
    pub limit: Option<u64>,
    #[serde(deserialize_with = "deserialize_optional_number")]
    pub offset: Option<u64>,
}

impl FilterCriteria {
    pub fn date(&self) -> Option<&str> {
        supplied(&self.date)
    }

    pub fn text(&self) -> Option<&str> {
        supplied(&self.text)
    }

    pub fn status(&self) -> Option<&str> {
        supplied(&self.status)
    }

    /// 是否没有任何筛选条件（分页参数不算）
    pub fn is_empty(&self) -> bool {
        self.date().is_none()
            && self.text().is_none()
            && self.status().is_none()
            && self.quantity_min.is_none()
            && self.quantity_max.is_none()
    }
}

/// 空字符串视为未提供
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// 接受数字、数字字符串或空字符串（查询参数可能以任意形式传入）
fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = Option<u64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer, a numeric string, or an empty string")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("negative value: {value}")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let value = value.trim();
            if value.is_empty() {
                return Ok(None);
            }
            value
                .parse::<u64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid number: {value}")))
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_equals_absent() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"date": "", "product": "", "status": "", "quantityMin": "", "quantityMax": null}"#,
        )
        .unwrap();

        assert!(criteria.is_empty());
        assert_eq!(criteria.date(), None);
        assert_eq!(criteria.quantity_min, None);
        assert_eq!(criteria.quantity_max, None);
    }

    #[test]
    fn test_quantity_accepts_string_or_number() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"quantityMin": "5", "quantityMax": 12, "limit": "20"}"#).unwrap();

        assert_eq!(criteria.quantity_min, Some(5));
        assert_eq!(criteria.quantity_max, Some(12));
        assert_eq!(criteria.limit, Some(20));
        assert!(!criteria.is_empty());
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let result = serde_json::from_str::<FilterCriteria>(r#"{"quantityMin": -1}"#);
        assert!(result.is_err());
    }
}
