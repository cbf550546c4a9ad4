//! Composes customer-facing messages and hands them to the notification queue.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;

use super::notification_queue::NotificationQueue;
use crate::config::StoreProfile;
use crate::domain::notification::{NotificationJob, OutboundEmail};
use crate::domain::order::Order;
use crate::domain::user::User;

/// Days between order placement and the promised delivery date.
const DELIVERY_DAYS: i64 = 3;

#[derive(Clone)]
pub struct Notifier {
    queue: NotificationQueue,
    store: StoreProfile,
}

impl Notifier {
    pub fn new(queue: NotificationQueue, store: StoreProfile) -> Self {
        Self { queue, store }
    }

    pub fn store(&self) -> &StoreProfile {
        &self.store
    }

    /// Confirmation email plus, when the customer left a phone number, a
    /// WhatsApp message.
    pub fn order_placed(&self, order: &Order) {
        let delivery = delivery_date(Utc::now());

        self.queue.enqueue(NotificationJob::Email(order_confirmation_email(
            &self.store,
            order,
            &delivery,
        )));

        if order.customer_phone.is_empty() {
            info!(
                "Order {} has no customer phone; skipping WhatsApp",
                order.order_number
            );
            return;
        }
        self.queue.enqueue(NotificationJob::WhatsApp {
            to: format!("whatsapp:{}", order.customer_phone),
            body: order_whatsapp_message(&self.store, order, &delivery),
        });
    }

    pub fn user_registered(&self, user: &User) {
        self.queue
            .enqueue(NotificationJob::Email(welcome_email(&self.store, user)));
    }

    pub fn send_email(&self, email: OutboundEmail) {
        self.queue.enqueue(NotificationJob::Email(email));
    }
}

pub fn delivery_date(now: DateTime<Utc>) -> String {
    (now + chrono::Duration::days(DELIVERY_DAYS))
        .format("%d %b, %Y")
        .to_string()
}

pub fn tracking_url(store: &StoreProfile, order_number: &str) -> String {
    format!(
        "{}/track/{}",
        store.site_url.trim_end_matches('/'),
        urlencoding::encode(order_number)
    )
}

/// `wa.me` link that opens a chat with the store, pre-filled with the
/// confirmation text. Needs no messaging account on our side.
pub fn whatsapp_link(store: &StoreProfile, order: &Order) -> String {
    let text = format!(
        "🎉 {} Order Confirmed!\nOrder #{}\nTotal: ₹{}\nHi {}! Delivery in 2-4 days! 🚚",
        store.name, order.order_number, order.total_amount, order.customer_name
    );
    format!(
        "https://wa.me/{}?text={}",
        store.whatsapp_number,
        urlencoding::encode(&text)
    )
}

pub fn order_whatsapp_message(store: &StoreProfile, order: &Order, delivery: &str) -> String {
    format!(
        "✅ *{store} Order Confirmed*\n\n\
         👤 Name: {name}\n\
         🧾 Order ID: {number}\n\
         💰 Amount: ₹{amount}\n\
         📅 Delivery: {delivery}\n\n\
         Thank you for shopping with {store} 🌾",
        store = store.name,
        name = order.customer_name,
        number = order.order_number,
        amount = order.total_amount,
    )
}

pub fn order_confirmation_email(store: &StoreProfile, order: &Order, delivery: &str) -> OutboundEmail {
    let track = tracking_url(store, &order.order_number);
    let number = escape_html(&order.order_number);
    let name = escape_html(&order.customer_name);

    let html = format!(
        r#"<h2 style="color: #f59e0b;">🎉 Order #{number} Confirmed!</h2>
<p>Hi <strong>{name}</strong>,</p>
<table style="border-collapse: collapse; width: 100%;">
  <tr><td><strong>Order ID:</strong></td><td>{number}</td></tr>
  <tr><td><strong>Total:</strong></td><td>₹{amount}</td></tr>
  <tr><td><strong>Payment:</strong></td><td>{payment}</td></tr>
  <tr><td><strong>Items:</strong></td><td>{items}</td></tr>
  <tr><td><strong>Address:</strong></td><td>{address}</td></tr>
  <tr><td><strong>Expected delivery:</strong></td><td>{delivery}</td></tr>
</table>
<p style="margin-top: 20px;">
  <a href="{track}" style="background: #f59e0b; color: white; padding: 12px 24px; text-decoration: none; border-radius: 8px;">📦 Track Order</a>
</p>
<hr>
<small>{store} - Fresh &amp; Fast Delivery</small>"#,
        amount = order.total_amount,
        payment = escape_html(&order.payment_method.to_uppercase()),
        items = order.items_count,
        address = escape_html(&order.customer_address),
        track = escape_html(&track),
        store = escape_html(&store.name),
    );

    let text = format!(
        "Hi {},\n\nYour order #{} is confirmed.\nTotal: ₹{}\nPayment: {}\nItems: {}\nExpected delivery: {}\n\nTrack it at {}\n",
        order.customer_name,
        order.order_number,
        order.total_amount,
        order.payment_method.to_uppercase(),
        order.items_count,
        delivery,
        track,
    );

    OutboundEmail {
        to: order.customer_email.clone(),
        subject: format!("Order #{} Confirmed - {}", order.order_number, store.name),
        text,
        html: Some(html),
    }
}

pub fn welcome_email(store: &StoreProfile, user: &User) -> OutboundEmail {
    let site = store.site_url.trim_end_matches('/');
    let html = format!(
        r#"<h2>Welcome to the {store} family, {name}!</h2>
<p>Your account is ready. Manage it any time from <a href="{site}/my-account/">your account page</a>.</p>
<p>Forgot your password? <a href="{site}/reset-password/">Reset it here</a>.</p>"#,
        store = escape_html(&store.name),
        name = escape_html(&user.name),
        site = escape_html(site),
    );
    OutboundEmail {
        to: user.email.clone(),
        subject: format!("Welcome to {} Family! – A Dry Fruits Love 🍇", store.name),
        text: format!(
            "Welcome to {}, {}!\n\nYour account is ready: {}/my-account/\n",
            store.name, user.name, site
        ),
        html: Some(html),
    }
}

pub fn otp_email(
    store: &StoreProfile,
    to: &str,
    code: &str,
    ttl: Option<Duration>,
) -> OutboundEmail {
    let text = match ttl {
        Some(ttl) => format!(
            "Your OTP is: {code}\nIt is valid for {} minutes.",
            ttl.as_secs() / 60
        ),
        None => format!("Your OTP is: {code}"),
    };
    OutboundEmail {
        to: to.to_string(),
        subject: format!("{} - Email Verification OTP", store.name),
        text,
        html: None,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
