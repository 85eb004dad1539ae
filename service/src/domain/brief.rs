//! [`Brief`] definitions.

use std::num::NonZeroU16;

use crate::domain::{
    contact,
    property::{self, Category},
    telegram,
};

/// Request of a prospective owner to get listed.
///
/// [`Brief`]s are never stored, only relayed to the operators.
#[derive(Clone, Debug)]
pub struct Brief {
    /// [`Category`] of the objects to be listed.
    pub category: Category,

    /// Name of the objects to be listed.
    pub name: property::Name,

    /// Address of the objects to be listed.
    pub address: property::Address,

    /// Nearest public transit, if any.
    pub transit: Option<property::TransitLabel>,

    /// Number of the objects to be listed.
    pub objects_count: NonZeroU16,

    /// [`Website`] of the objects, if any.
    pub website: Option<Website>,

    /// [`contact::Phone`] to call back.
    pub phone: contact::Phone,

    /// [`telegram::Handle`] to write back, if any.
    pub telegram: Option<telegram::Handle>,

    /// Full name of the owner.
    pub owner_name: contact::FullName,
}

impl Brief {
    /// Renders this [`Brief`] as a [`telegram::Message`] for the operators.
    #[must_use]
    pub fn to_message(&self) -> telegram::Message {
        use telegram::escape;

        let mut lines = vec![
            "🏢 Новая заявка на размещение".to_owned(),
            String::new(),
            format!("📋 Категория: {}", self.category.config().label),
            format!("🏠 Наименование: {}", escape(self.name.as_ref())),
            format!("📍 Адрес: {}", escape(self.address.as_ref())),
        ];
        if let Some(transit) = &self.transit {
            lines.push(format!("🚇 Метро: {}", escape(transit.as_ref())));
        }
        lines.push(format!("🔢 Количество объектов: {}", self.objects_count));
        if let Some(website) = &self.website {
            lines.push(format!("🌐 Сайт: {}", escape(website.as_ref())));
        }
        lines.push(format!("📞 Телефон: {}", escape(self.phone.as_ref())));
        if let Some(handle) = &self.telegram {
            lines.push(format!("💬 Telegram: {}", escape(handle.as_ref())));
        }
        lines.push(format!(
            "👤 Имя собственника: {}",
            escape(self.owner_name.as_ref()),
        ));

        telegram::Message::from_lines(lines)
    }
}

define_text! {
    /// Website address mentioned in a [`Brief`].
    Website(max_len = 2048)
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use crate::domain::{contact, property, telegram};

    use super::{Brief, Website};

    fn brief() -> Brief {
        Brief {
            category: property::Category::Sauna,
            name: property::Name::new("Баня <№1>").unwrap(),
            address: property::Address::new("Тверская, 25").unwrap(),
            transit: None,
            objects_count: NonZeroU16::new(3).unwrap(),
            website: None,
            phone: contact::Phone::new("+7 999 123-45-67").unwrap(),
            telegram: None,
            owner_name: contact::FullName::new("Анна").unwrap(),
        }
    }

    #[test]
    fn renders_required_lines_only() {
        let msg = brief().to_message();
        let lines = msg.as_ref().lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "🏢 Новая заявка на размещение");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "📋 Категория: Сауна");
        assert_eq!(lines.len(), 8);
        assert!(!msg.as_ref().contains("Метро"));
        assert!(!msg.as_ref().contains("Сайт"));
        assert!(!msg.as_ref().contains("Telegram"));
    }

    #[test]
    fn renders_optional_lines_in_order() {
        let brief = Brief {
            transit: Some(property::TransitLabel::new("Пушкинская").unwrap()),
            website: Some(Website::new("https://banya.example").unwrap()),
            telegram: Some(telegram::Handle::new("@banya").unwrap()),
            ..brief()
        };

        let msg = brief.to_message();
        let text = msg.as_ref();

        let metro = text.find("🚇 Метро: Пушкинская").unwrap();
        let count = text.find("🔢 Количество объектов: 3").unwrap();
        let site = text.find("🌐 Сайт: https://banya.example").unwrap();
        let tg = text.find("💬 Telegram: @banya").unwrap();
        assert!(metro < count && count < site && site < tg);
    }

    #[test]
    fn escapes_user_input() {
        let msg = brief().to_message();

        assert!(msg.as_ref().contains("🏠 Наименование: Баня &lt;№1&gt;"));
    }
}
