//! The operation catalogue.
//!
//! Each gateway operation is a thin builder of an operation body — the
//! `method` field plus its parameters — handed to the generic call pipeline.
//! Optional parameters are `Option` fields on small parameter structs and are
//! omitted from the body entirely when absent, never sent as empty strings.

use serde_json::{Map, Value};

use super::{CallResult, MonexyClient};
use crate::error::ClientError;

/// Amount, order reference, and currency shared by the payment operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Operation amount.
    pub amount: f64,
    /// Merchant-side order identifier.
    pub order_id: String,
    /// Payment purpose shown to the user.
    pub order_desc: String,
    /// Operation currency, `UAH` by default.
    pub currency: String,
}

impl Order {
    /// Creates an order in the default currency.
    #[must_use]
    pub fn new(amount: f64, order_id: impl Into<String>, order_desc: impl Into<String>) -> Self {
        Self {
            amount,
            order_id: order_id.into(),
            order_desc: order_desc.into(),
            currency: "UAH".to_owned(),
        }
    }

    /// Overrides the operation currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// Filters for the wallet history listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CardHistoryQuery {
    /// Period start, `Y-m-d H:i:s`; the server defaults to one month back.
    pub period_from: Option<String>,
    /// Period end, `Y-m-d H:i:s`; the server defaults to now.
    pub period_to: Option<String>,
    /// Page number, starting at 1.
    pub page: u32,
    /// Records per page.
    pub per_page: u32,
    /// Filter by operation type.
    pub pay_type: Option<String>,
    /// Filter by correspondent.
    pub correspondent: Option<String>,
}

impl Default for CardHistoryQuery {
    fn default() -> Self {
        Self {
            period_from: None,
            period_to: None,
            page: 1,
            per_page: 5,
            pay_type: None,
            correspondent: None,
        }
    }
}

/// Payer identification for customer-to-business payments: a phone number,
/// a prepaid card number, or neither (the gateway then resolves the payer
/// from session context).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct C2bPayer {
    /// Payer phone number.
    pub phone: Option<String>,
    /// Prepaid card number.
    pub prepaid_id: Option<String>,
}

/// Parameters of a user-to-user transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct P2pTransfer {
    /// Operation amount.
    pub amount: f64,
    /// Payer phone number.
    pub payer_phone: String,
    /// Recipient phone number.
    pub recipient_phone: String,
    /// Payment purpose.
    pub order_desc: String,
    /// Optional merchant-side order identifier.
    pub order_id: Option<String>,
    /// Operation currency, `UAH` by default.
    pub currency: String,
}

impl P2pTransfer {
    /// Creates a transfer in the default currency with no order reference.
    #[must_use]
    pub fn new(
        amount: f64,
        payer_phone: impl Into<String>,
        recipient_phone: impl Into<String>,
        order_desc: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            payer_phone: payer_phone.into(),
            recipient_phone: recipient_phone.into(),
            order_desc: order_desc.into(),
            order_id: None,
            currency: "UAH".to_owned(),
        }
    }

    /// Attaches a merchant-side order identifier.
    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }
}

/// Parameters of a business-to-customer payout.
#[derive(Debug, Clone, PartialEq)]
pub struct B2cTransfer {
    /// Amount, order reference, and currency.
    pub order: Order,
    /// Paying merchant wallet.
    pub payer_card: u64,
    /// Recipient phone number.
    pub recipient_phone: String,
    /// Force an SMS notification to the recipient.
    pub force_send_sms: bool,
    /// Ask the gateway to generate vouchers for the payout.
    pub generate_vouchers: Option<bool>,
    /// Gateway-specific operation type marker.
    pub operation_type: Option<String>,
}

impl B2cTransfer {
    /// Creates a payout with notifications and voucher generation left at
    /// the server defaults.
    #[must_use]
    pub fn new(order: Order, payer_card: u64, recipient_phone: impl Into<String>) -> Self {
        Self {
            order,
            payer_card,
            recipient_phone: recipient_phone.into(),
            force_send_sms: false,
            generate_vouchers: None,
            operation_type: None,
        }
    }
}

/// Parameters of a voucher activation, shared by the by-phone and by-card
/// variants.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherActivation {
    /// Voucher number.
    pub number: String,
    /// Voucher PIN code.
    pub pin: String,
    /// Merchant-side order identifier.
    pub order_id: String,
    /// Payment purpose.
    pub order_desc: String,
    /// Marks the activation as a test request.
    pub is_test: bool,
}

impl VoucherActivation {
    /// Creates a non-test activation.
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        pin: impl Into<String>,
        order_id: impl Into<String>,
        order_desc: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            pin: pin.into(),
            order_id: order_id.into(),
            order_desc: order_desc.into(),
            is_test: false,
        }
    }
}

impl MonexyClient {
    /// Fetches the API account balance.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn balance(&self) -> Result<CallResult, ClientError> {
        self.call(op("balance"))
    }

    /// Fetches the balance of one wallet.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn card_balance(&self, card: u64) -> Result<CallResult, ClientError> {
        self.call(card_balance_body(card))
    }

    /// Lists wallet operations for a period, paginated.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn card_history(
        &self,
        card: u64,
        query: &CardHistoryQuery,
    ) -> Result<CallResult, ClientError> {
        self.call(card_history_body(card, query))
    }

    /// Checks the status of a previously submitted payment.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn payment_status(&self, order_id: &str) -> Result<CallResult, ClientError> {
        self.call(payment_status_body(order_id))
    }

    /// Verifies that a customer-to-business payment would be accepted.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn check_payment_c2b(
        &self,
        order: &Order,
        recipient_card: u64,
        payer: &C2bPayer,
    ) -> Result<CallResult, ClientError> {
        self.call(c2b_body("check-payment-c2b", order, recipient_card, payer))
    }

    /// Initiates a customer-to-business payment. The payer confirms it with
    /// [`MonexyClient::confirm_payment_c2b`].
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn payment_c2b(
        &self,
        order: &Order,
        recipient_card: u64,
        payer: &C2bPayer,
    ) -> Result<CallResult, ClientError> {
        self.call(c2b_body("payment-c2b", order, recipient_card, payer))
    }

    /// Confirms a customer-to-business payment with the SMS code sent to the
    /// payer.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn confirm_payment_c2b(
        &self,
        payment_id: u64,
        sms_code: &str,
    ) -> Result<CallResult, ClientError> {
        self.call(confirm_body("confirm-payment-c2b", payment_id, sms_code))
    }

    /// Verifies that a user-to-user transfer would be accepted.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn check_payment_p2p(&self, transfer: &P2pTransfer) -> Result<CallResult, ClientError> {
        self.call(p2p_body("check-payment-p2p", transfer))
    }

    /// Initiates a user-to-user transfer.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn payment_p2p(&self, transfer: &P2pTransfer) -> Result<CallResult, ClientError> {
        self.call(p2p_body("payment-p2p", transfer))
    }

    /// Confirms a user-to-user transfer with the SMS code sent to the payer.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn confirm_payment_p2p(
        &self,
        payment_id: u64,
        sms_code: &str,
    ) -> Result<CallResult, ClientError> {
        self.call(confirm_body("confirm-payment-p2p", payment_id, sms_code))
    }

    /// Verifies that a business-to-customer payout would be accepted.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn check_payment_b2c(&self, transfer: &B2cTransfer) -> Result<CallResult, ClientError> {
        self.call(b2c_body("check-payment-b2c", transfer, false))
    }

    /// Executes a business-to-customer payout.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn payment_b2c(&self, transfer: &B2cTransfer) -> Result<CallResult, ClientError> {
        self.call(b2c_body("payment-b2c", transfer, true))
    }

    /// Cancels a transaction.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn cancel_payment(&self, trans_id: u64) -> Result<CallResult, ClientError> {
        self.call(trans_body("cancel-payment", trans_id))
    }

    /// Checks the status of a cancellation.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn check_cancel_status(&self, trans_id: u64) -> Result<CallResult, ClientError> {
        self.call(trans_body("check-cancel-status", trans_id))
    }

    /// Creates a voucher funded from a merchant wallet.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn create_voucher(
        &self,
        payer_card: u64,
        order: &Order,
        is_test: Option<bool>,
    ) -> Result<CallResult, ClientError> {
        self.call(create_voucher_body(payer_card, order, is_test))
    }

    /// Fetches the remaining balance of a voucher.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn voucher_balance(&self, number: &str, pin: &str) -> Result<CallResult, ClientError> {
        self.call(voucher_balance_body(number, pin))
    }

    /// Activates a voucher onto a user's phone number.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn activate_voucher_by_phone(
        &self,
        activation: &VoucherActivation,
        recipient_phone: &str,
    ) -> Result<CallResult, ClientError> {
        self.call(activate_voucher_body(
            "activate-voucher-by-phone",
            activation,
            "recipientPhone",
            recipient_phone.into(),
        ))
    }

    /// Activates a voucher onto a wallet.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn activate_voucher_by_card(
        &self,
        activation: &VoucherActivation,
        recipient_card: u64,
    ) -> Result<CallResult, ClientError> {
        self.call(activate_voucher_body(
            "activate-voucher-by-card",
            activation,
            "recipientCard",
            recipient_card.into(),
        ))
    }

    /// Requests an automatic sign-in link for a user.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn client_autologin_link(&self, phone: &str) -> Result<CallResult, ClientError> {
        self.call(phone_body("client-autologin-link", phone))
    }

    /// Confirms an automatic sign-in link with the SMS code sent to the user.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn client_autologin_verify(
        &self,
        phone: &str,
        sms_code: &str,
    ) -> Result<CallResult, ClientError> {
        self.call(phone_sms_body("client-autologin-verify", phone, sms_code))
    }

    /// Requests a user's balance; the user receives an SMS code to approve
    /// the disclosure.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn client_balance(&self, phone: &str) -> Result<CallResult, ClientError> {
        self.call(phone_body("client-balance", phone))
    }

    /// Completes a user balance request with the SMS code.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn client_balance_confirm(
        &self,
        phone: &str,
        sms_code: &str,
    ) -> Result<CallResult, ClientError> {
        self.call(phone_sms_body("client-balance-confirm", phone, sms_code))
    }

    /// Withdraws merchant funds to the settlement account.
    ///
    /// # Errors
    ///
    /// See [`MonexyClient::call`].
    pub fn cash_out(
        &self,
        merchant_id: u64,
        amount: f64,
        order_id: &str,
    ) -> Result<CallResult, ClientError> {
        self.call(cash_out_body(merchant_id, amount, order_id))
    }
}

fn op(method: &str) -> Value {
    let mut body = Map::new();
    body.insert("method".to_owned(), method.into());
    Value::Object(body)
}

fn with_op(method: &str) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("method".to_owned(), method.into());
    body
}

fn card_balance_body(card: u64) -> Value {
    let mut body = with_op("card-balance");
    body.insert("card".to_owned(), card.into());
    Value::Object(body)
}

fn card_history_body(card: u64, query: &CardHistoryQuery) -> Value {
    let mut body = with_op("card-history");
    body.insert("card".to_owned(), card.into());
    if let Some(from) = &query.period_from {
        body.insert("periodFrom".to_owned(), from.as_str().into());
    }
    if let Some(to) = &query.period_to {
        body.insert("periodTo".to_owned(), to.as_str().into());
    }
    body.insert("page".to_owned(), query.page.into());
    body.insert("perPage".to_owned(), query.per_page.into());
    if let Some(pay_type) = &query.pay_type {
        body.insert("payType".to_owned(), pay_type.as_str().into());
    }
    if let Some(correspondent) = &query.correspondent {
        body.insert("correspondent".to_owned(), correspondent.as_str().into());
    }
    Value::Object(body)
}

fn payment_status_body(order_id: &str) -> Value {
    let mut body = with_op("payment-status");
    body.insert("orderId".to_owned(), order_id.into());
    Value::Object(body)
}

fn insert_order(body: &mut Map<String, Value>, order: &Order) {
    body.insert("amount".to_owned(), order.amount.into());
    body.insert("currency".to_owned(), order.currency.as_str().into());
    body.insert("orderId".to_owned(), order.order_id.as_str().into());
    body.insert("orderDesc".to_owned(), order.order_desc.as_str().into());
}

fn c2b_body(method: &str, order: &Order, recipient_card: u64, payer: &C2bPayer) -> Value {
    let mut body = with_op(method);
    insert_order(&mut body, order);
    body.insert("recipientCard".to_owned(), recipient_card.into());
    if let Some(prepaid_id) = &payer.prepaid_id {
        body.insert("payerPrepaidId".to_owned(), prepaid_id.as_str().into());
    }
    if let Some(phone) = &payer.phone {
        body.insert("payerPhone".to_owned(), phone.as_str().into());
    }
    Value::Object(body)
}

fn confirm_body(method: &str, payment_id: u64, sms_code: &str) -> Value {
    let mut body = with_op(method);
    body.insert("paymentId".to_owned(), payment_id.into());
    body.insert("smsCode".to_owned(), sms_code.into());
    Value::Object(body)
}

fn p2p_body(method: &str, transfer: &P2pTransfer) -> Value {
    let mut body = with_op(method);
    body.insert("amount".to_owned(), transfer.amount.into());
    body.insert("currency".to_owned(), transfer.currency.as_str().into());
    body.insert("orderDesc".to_owned(), transfer.order_desc.as_str().into());
    body.insert("payerPhone".to_owned(), transfer.payer_phone.as_str().into());
    body.insert(
        "recipientPhone".to_owned(),
        transfer.recipient_phone.as_str().into(),
    );
    if let Some(order_id) = &transfer.order_id {
        body.insert("orderId".to_owned(), order_id.as_str().into());
    }
    Value::Object(body)
}

fn b2c_body(method: &str, transfer: &B2cTransfer, allow_sms_flag: bool) -> Value {
    let mut body = with_op(method);
    insert_order(&mut body, &transfer.order);
    body.insert("payerCard".to_owned(), transfer.payer_card.into());
    body.insert(
        "recipientPhone".to_owned(),
        transfer.recipient_phone.as_str().into(),
    );
    if allow_sms_flag && transfer.force_send_sms {
        body.insert("forceSendSMS".to_owned(), true.into());
    }
    if let Some(generate) = transfer.generate_vouchers {
        body.insert("generateVouchers".to_owned(), generate.into());
    }
    if let Some(operation_type) = &transfer.operation_type {
        body.insert("operationType".to_owned(), operation_type.as_str().into());
    }
    Value::Object(body)
}

fn trans_body(method: &str, trans_id: u64) -> Value {
    let mut body = with_op(method);
    body.insert("transId".to_owned(), trans_id.into());
    Value::Object(body)
}

fn create_voucher_body(payer_card: u64, order: &Order, is_test: Option<bool>) -> Value {
    let mut body = with_op("create-voucher");
    body.insert("payerCard".to_owned(), payer_card.into());
    body.insert("amount".to_owned(), order.amount.into());
    body.insert("orderId".to_owned(), order.order_id.as_str().into());
    body.insert("orderDesc".to_owned(), order.order_desc.as_str().into());
    if let Some(is_test) = is_test {
        body.insert("isTest".to_owned(), is_test.into());
    }
    body.insert("currency".to_owned(), order.currency.as_str().into());
    Value::Object(body)
}

fn voucher_balance_body(number: &str, pin: &str) -> Value {
    let mut body = with_op("voucher-balance");
    body.insert("number".to_owned(), number.into());
    body.insert("pin".to_owned(), pin.into());
    Value::Object(body)
}

fn activate_voucher_body(
    method: &str,
    activation: &VoucherActivation,
    recipient_key: &str,
    recipient: Value,
) -> Value {
    let mut body = with_op(method);
    body.insert("number".to_owned(), activation.number.as_str().into());
    body.insert("pin".to_owned(), activation.pin.as_str().into());
    body.insert("orderId".to_owned(), activation.order_id.as_str().into());
    body.insert("orderDesc".to_owned(), activation.order_desc.as_str().into());
    body.insert(recipient_key.to_owned(), recipient);
    body.insert("isTest".to_owned(), activation.is_test.into());
    Value::Object(body)
}

fn phone_body(method: &str, phone: &str) -> Value {
    let mut body = with_op(method);
    body.insert("phone".to_owned(), phone.into());
    Value::Object(body)
}

fn phone_sms_body(method: &str, phone: &str, sms_code: &str) -> Value {
    let mut body = with_op(method);
    body.insert("phone".to_owned(), phone.into());
    body.insert("smsCode".to_owned(), sms_code.into());
    Value::Object(body)
}

fn cash_out_body(merchant_id: u64, amount: f64, order_id: &str) -> Value {
    let mut body = with_op("cash-out");
    body.insert("merchantId".to_owned(), merchant_id.into());
    body.insert("amount".to_owned(), amount.into());
    body.insert("orderId".to_owned(), order_id.into());
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_history_query_omits_filters() {
        let body = card_history_body(42, &CardHistoryQuery::default());
        assert_eq!(
            body,
            json!({
                "method": "card-history",
                "card": 42,
                "page": 1,
                "perPage": 5
            })
        );
    }

    #[test]
    fn history_filters_appear_when_set() {
        let query = CardHistoryQuery {
            period_from: Some("2026-01-01 00:00:00".to_owned()),
            pay_type: Some("in".to_owned()),
            ..CardHistoryQuery::default()
        };
        let body = card_history_body(42, &query);
        assert_eq!(body["periodFrom"], json!("2026-01-01 00:00:00"));
        assert_eq!(body["payType"], json!("in"));
        assert!(body.get("periodTo").is_none());
        assert!(body.get("correspondent").is_none());
    }

    #[test]
    fn c2b_field_order_matches_the_wire_contract() {
        let order = Order::new(10.5, "ord-1", "Coffee");
        let body = c2b_body("payment-c2b", &order, 777, &C2bPayer::default());
        assert_eq!(
            body.to_string(),
            r#"{"method":"payment-c2b","amount":10.5,"currency":"UAH","orderId":"ord-1","orderDesc":"Coffee","recipientCard":777}"#
        );
    }

    #[test]
    fn c2b_payer_identification_is_optional() {
        let order = Order::new(1.0, "ord-2", "Tea");
        let payer = C2bPayer {
            phone: Some("380501234567".to_owned()),
            prepaid_id: None,
        };
        let body = c2b_body("check-payment-c2b", &order, 777, &payer);
        assert_eq!(body["payerPhone"], json!("380501234567"));
        assert!(body.get("payerPrepaidId").is_none());
    }

    #[test]
    fn p2p_order_id_is_optional() {
        let transfer = P2pTransfer::new(5.0, "380501111111", "380502222222", "Lunch");
        assert!(p2p_body("payment-p2p", &transfer).get("orderId").is_none());
        let with_order = transfer.with_order_id("ord-3");
        assert_eq!(
            p2p_body("payment-p2p", &with_order)["orderId"],
            json!("ord-3")
        );
    }

    #[test]
    fn b2c_check_never_carries_the_sms_flag() {
        let mut transfer = B2cTransfer::new(Order::new(20.0, "ord-4", "Payout"), 777, "380503333333");
        transfer.force_send_sms = true;
        assert!(
            b2c_body("check-payment-b2c", &transfer, false)
                .get("forceSendSMS")
                .is_none()
        );
        assert_eq!(
            b2c_body("payment-b2c", &transfer, true)["forceSendSMS"],
            json!(true)
        );
    }

    #[test]
    fn create_voucher_marks_tests_only_when_asked() {
        let order = Order::new(50.0, "ord-5", "Gift");
        assert!(
            create_voucher_body(777, &order, None)
                .get("isTest")
                .is_none()
        );
        assert_eq!(
            create_voucher_body(777, &order, Some(true))["isTest"],
            json!(true)
        );
    }

    #[test]
    fn voucher_activation_targets_differ_by_variant() {
        let activation = VoucherActivation::new("V-123", "9999", "ord-6", "Topup");
        let by_phone = activate_voucher_body(
            "activate-voucher-by-phone",
            &activation,
            "recipientPhone",
            "380504444444".into(),
        );
        assert_eq!(by_phone["recipientPhone"], json!("380504444444"));
        assert_eq!(by_phone["isTest"], json!(false));

        let by_card =
            activate_voucher_body("activate-voucher-by-card", &activation, "recipientCard", 777.into());
        assert_eq!(by_card["recipientCard"], json!(777));
    }

    #[test]
    fn simple_bodies_carry_their_single_parameter() {
        assert_eq!(
            trans_body("cancel-payment", 9001),
            json!({ "method": "cancel-payment", "transId": 9001 })
        );
        assert_eq!(
            phone_body("client-balance", "380505555555"),
            json!({ "method": "client-balance", "phone": "380505555555" })
        );
        assert_eq!(
            cash_out_body(777, 100.0, "ord-7"),
            json!({ "method": "cash-out", "merchantId": 777, "amount": 100.0, "orderId": "ord-7" })
        );
    }
}
