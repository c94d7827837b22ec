use crate::gateway::{CallbackVerdict, GatewayError, RedirectRequest, VnPayGateway};
use std::{collections::HashMap, sync::Arc};

pub type DynPaymentGateway = Arc<dyn PaymentGatewayTrait + Send + Sync>;

pub trait PaymentGatewayTrait {
    fn build_redirect_url(&self, req: &RedirectRequest<'_>) -> Result<String, GatewayError>;
    fn verify_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<CallbackVerdict, GatewayError>;
}

impl PaymentGatewayTrait for VnPayGateway {
    fn build_redirect_url(&self, req: &RedirectRequest<'_>) -> Result<String, GatewayError> {
        VnPayGateway::build_redirect_url(self, req)
    }

    fn verify_callback(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<CallbackVerdict, GatewayError> {
        VnPayGateway::verify_callback(self, params)
    }
}
