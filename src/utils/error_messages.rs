//! Messages destinés aux utilisateurs du portail (en portugais,
//! la langue de la clinique).

pub const VALIDATION_ERROR: &str = "Por favor, corrija os erros no formulário";

pub const LOGIN_ERROR: &str = "Email ou senha incorretos";

pub const NOT_AUTHORIZED: &str = "Não autorizado";

pub const ADMINS_ONLY: &str = "Apenas administradores podem executar esta operação";

pub const CANNOT_DELETE_ADMIN: &str = "Não é possível excluir administradores";

pub const EMAIL_TAKEN: &str = "Este email já está cadastrado";

pub const EMAIL_PASSWORD_REQUIRED: &str = "Email e senha são obrigatórios";

pub const USER_ID_REQUIRED: &str = "ID do usuário é obrigatório";

pub const NOT_FOUND: &str = "Registro não encontrado";

pub const SERVER_ERROR: &str = "Erro ao processar solicitação";

// Messages de succès des opérations.
pub const REPORT_CREATED: &str = "Relatório criado!";
pub const REPORT_UPDATED: &str = "Relatório atualizado!";
pub const REPORT_DELETED: &str = "Relatório excluído!";
pub const USER_DELETED: &str = "Usuário deletado com sucesso";
pub const ORPHANS_DELETED: &str = "Registros órfãos deletados com sucesso";
pub const ADMIN_CONFIGURED: &str = "Admin configurado com sucesso";
pub const LOGOUT_OK: &str = "Sessão encerrada";
